use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display as StrumDisplay};

use crate::config::PatchOptions;
use crate::document::Document;
use crate::errors::PatchError;
use crate::handlers;
use crate::operation::Operation;
use crate::preview;
use crate::selector::{self, Selector};
use crate::validation;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    /// The selector matched no elements
    SelectorMiss,
    /// The selector could not be compiled
    InvalidSelector,
    /// The handler could not interpret existing element state
    HandlerError,
}

/// A per-operation fault that was recorded instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 1-based position of the operation in the batch
    pub index: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.index, self.kind, self.message)
    }
}

/// Result of a successful `apply`: the patched document and what could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Outcome {
    document: String,
    #[fieldwork(get(copy))]
    attempted: usize,
    warnings: Vec<Warning>,
}

impl Outcome {
    pub fn into_document(self) -> String {
        self.document
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Unified diff from `original` to the patched document.
    pub fn preview(&self, original: &str) -> String {
        preview::diff(original, &self.document)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "attempted: {}", self.attempted)?;
        write!(f, "warnings: {}", self.warnings.len())?;
        for warning in &self.warnings {
            write!(f, "\n  {warning}")?;
        }
        Ok(())
    }
}

/// Applies operation batches with a fixed configuration.
///
/// Holds no state between calls; every call parses and owns its own tree.
#[derive(Debug, Clone, Default, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Patcher {
    options: PatchOptions,
}

impl Patcher {
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    /// Validates `operations`, parses `document` and applies every operation in order.
    ///
    /// Only validation and parse failures are errors; everything that goes wrong
    /// while applying a single operation becomes a [`Warning`].
    pub fn apply(&self, document: &str, operations: &Value) -> Result<Outcome, PatchError> {
        let operations =
            validation::validate_with_limit(operations, self.options.max_operations)?;
        self.run(document, &operations)
    }

    /// Same as [`Patcher::apply`] for operations that are already typed.
    pub fn apply_operations(
        &self,
        document: &str,
        operations: &[Operation],
    ) -> Result<Outcome, PatchError> {
        validation::check_operations(operations, self.options.max_operations)?;
        self.run(document, operations)
    }

    fn run(&self, text: &str, operations: &[Operation]) -> Result<Outcome, PatchError> {
        let document = Document::parse(text, &self.options.parse)?;

        let Pass { document, warnings } = operations
            .iter()
            .enumerate()
            .fold(Pass::new(document), |pass, (offset, operation)| {
                pass.step(offset + 1, operation)
            });

        log::debug!(
            "applied {} operation(s) with {} warning(s)",
            operations.len(),
            warnings.len()
        );

        Ok(Outcome {
            document: document.serialize(),
            attempted: operations.len(),
            warnings,
        })
    }
}

/// Accumulator threaded through the batch.
struct Pass {
    document: Document,
    warnings: Vec<Warning>,
}

impl Pass {
    fn new(document: Document) -> Self {
        Self {
            document,
            warnings: Vec::new(),
        }
    }

    fn step(mut self, index: usize, operation: &Operation) -> Self {
        let selector = match Selector::parse(operation.selector()) {
            Ok(selector) => selector,
            Err(error) => {
                self.warn(index, WarningKind::InvalidSelector, error.to_string());
                return self;
            }
        };

        let targets = selector::resolve(&self.document, &selector);
        if targets.is_empty() {
            self.warn(
                index,
                WarningKind::SelectorMiss,
                format!("selector `{selector}` matched no elements"),
            );
            return self;
        }

        log::debug!("operation {index}: {operation} on {} element(s)", targets.len());
        if let Err(error) = handlers::apply(&mut self.document, operation, &targets) {
            self.warn(index, WarningKind::HandlerError, error.to_string());
        }
        self
    }

    fn warn(&mut self, index: usize, kind: WarningKind, message: String) {
        log::warn!("operation {index}: {kind}: {message}");
        self.warnings.push(Warning {
            index,
            kind,
            message,
        });
    }
}

/// [`Patcher::apply`] with default options.
pub fn apply(document: &str, operations: &Value) -> Result<Outcome, PatchError> {
    Patcher::default().apply(document, operations)
}

/// [`Patcher::apply_operations`] with default options.
pub fn apply_operations(document: &str, operations: &[Operation]) -> Result<Outcome, PatchError> {
    Patcher::default().apply_operations(document, operations)
}
