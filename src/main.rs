use std::{
    fs::OpenOptions,
    io::{BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use html_patch::{
    decode_planner_response, traits::operation_schema, validation, ApplyRequest, ApplyResponse,
    PatchOptions, Patcher,
};

/// Apply structured edit operations to HTML documents
#[derive(Parser, Debug)]
#[command(name = "html-patch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an operation list to a document
    Apply {
        /// HTML document to patch
        #[arg(long)]
        document: PathBuf,

        /// JSON array of operations, or `-` for stdin
        #[arg(long)]
        operations: PathBuf,

        /// Write the patched document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print a diff of the change to stderr
        #[arg(long)]
        diff: bool,

        /// Print the full JSON response instead of the bare document
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: PatchOptions,
    },

    /// Check an operation list without touching any document
    Validate {
        /// JSON array of operations, or `-` for stdin
        #[arg(long)]
        operations: PathBuf,

        /// Reject batches longer than this many operations
        #[arg(long, env = "HTML_PATCH_MAX_OPERATIONS")]
        max_operations: Option<usize>,
    },

    /// Print the JSON Schema of a single operation
    Schema,

    /// Turn a raw planner reply into a normalized operation list
    Decode {
        /// The planner's reply text, or `-` for stdin
        #[arg(long)]
        response: PathBuf,
    },

    /// Read one JSON request per line on stdin and answer one JSON response per line
    Serve {
        #[command(flatten)]
        options: PatchOptions,
    },
}

fn main() -> Result<ExitCode> {
    init_logging()?;
    let cli = Cli::parse();
    log::debug!("{cli:?}");

    match cli.command {
        Command::Apply {
            document,
            operations,
            out,
            diff,
            json,
            options,
        } => apply(&document, &operations, out.as_deref(), diff, json, options),
        Command::Validate {
            operations,
            max_operations,
        } => {
            let operations: serde_json::Value = serde_json::from_str(&read_input(&operations)?)
                .context("operations are not valid JSON")?;
            let validated = validation::validate_with_limit(&operations, max_operations)?;
            println!("{} operation(s) are valid", validated.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&operation_schema())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Decode { response } => {
            let operations = decode_planner_response(&read_input(&response)?)?;
            println!("{}", serde_json::to_string_pretty(&operations)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { options } => {
            serve(&Patcher::new(options))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging() -> Result<()> {
    let mut builder = Builder::from_default_env();
    if let Ok(log_location) = std::env::var("LOG_LOCATION") {
        let path = PathBuf::from(&*shellexpand::tilde(&log_location));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
    }
}

fn apply(
    document_path: &Path,
    operations_path: &Path,
    out: Option<&Path>,
    diff: bool,
    json: bool,
    options: PatchOptions,
) -> Result<ExitCode> {
    let document = read_input(document_path)?;
    let operations: serde_json::Value = serde_json::from_str(&read_input(operations_path)?)
        .context("operations are not valid JSON")?;

    let result = Patcher::new(options).apply(&document, &operations);

    if json {
        let response = ApplyResponse::from(result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(if response.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let outcome = result?;
    eprintln!("{outcome}");
    if diff {
        eprintln!("{}", outcome.preview(&document));
    }

    match out {
        Some(path) => std::fs::write(path, outcome.document())
            .with_context(|| format!("could not write {}", path.display()))?,
        None => println!("{}", outcome.document()),
    }

    Ok(ExitCode::SUCCESS)
}

fn serve(patcher: &Patcher) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                if line.trim().is_empty() {
                    continue;
                }
                log::trace!("<- {line}");
                let response = match serde_json::from_str::<ApplyRequest>(&line) {
                    Ok(request) => ApplyResponse::from(
                        patcher.apply(&request.document, &request.operations),
                    ),
                    Err(e) => ApplyResponse::failure(format!("invalid request: {e}"), None),
                };
                let response_str = serde_json::to_string(&response)?;
                log::trace!("-> {response_str}");
                stdout.write_all(response_str.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
            }
            Err(e) => {
                log::error!("Error reading line: {e}");
                break;
            }
        }
    }

    Ok(())
}
