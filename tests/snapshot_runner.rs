use anyhow::{anyhow, Result};
use diffy::{DiffOptions, PatchFormatter};
use html_patch::{PatchOptions, Patcher};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Runs every case under `tests/snapshots`.
///
/// A case is a directory holding `input.html` and `operations.json`, and
/// optionally `options.json` (a serialized `PatchOptions`). The outcome report
/// is compared against `response.txt` and the patched document against
/// `output.html`; a failed call has no `output.html`.
pub struct SnapshotRunner {
    update_mode: bool,
    test_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SnapshotTest {
    pub name: String,
    pub input_path: PathBuf,
    pub operations_path: PathBuf,
    pub options_path: PathBuf,
    pub response_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub struct SnapshotResult {
    pub test: SnapshotTest,
    pub actual_response: String,
    pub expected_response: Option<String>,
    pub actual_output: Option<String>,
    pub expected_output: Option<String>,
    pub error: Option<String>,
    pub response_matches: bool,
    pub output_matches: bool,
}

#[derive(Debug)]
struct SnapshotExecutionResult {
    response: String,
    output: Option<String>,
}

impl SnapshotRunner {
    pub fn new(update_mode: bool, test_filter: Option<String>) -> Self {
        Self {
            update_mode,
            test_filter,
        }
    }

    /// Discover all snapshot tests in the tests/snapshots directory
    pub fn discover_tests(&self) -> Result<Vec<SnapshotTest>> {
        let snapshots_dir = Path::new("tests/snapshots");
        let mut tests = Vec::new();

        Self::discover_tests_recursive(snapshots_dir, &mut tests)?;

        tests.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tests)
    }

    /// Filter tests based on the TEST_FILTER environment variable
    /// Supports patterns like:
    /// - "basic" (matches all tests starting with this)
    /// - "basic::style_change" (exact match)
    /// - "basic,failures" (multiple patterns separated by commas)
    fn filter_tests(&self, tests: Vec<SnapshotTest>) -> Vec<SnapshotTest> {
        let Some(filter) = &self.test_filter else {
            return tests;
        };
        let patterns: Vec<&str> = filter.split(',').map(|s| s.trim()).collect();

        tests
            .into_iter()
            .filter(|test| {
                patterns.iter().any(|pattern| {
                    if pattern.is_empty() {
                        false
                    } else if pattern.contains("::") {
                        test.name == *pattern
                    } else {
                        test.name.starts_with(pattern)
                    }
                })
            })
            .collect()
    }

    fn discover_tests_recursive(dir: &Path, tests: &mut Vec<SnapshotTest>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let operations_path = path.join("operations.json");
            if operations_path.exists() {
                let name = path
                    .strip_prefix("tests/snapshots")
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('/', "::");

                tests.push(SnapshotTest {
                    name,
                    input_path: path.join("input.html"),
                    operations_path,
                    options_path: path.join("options.json"),
                    response_path: path.join("response.txt"),
                    output_path: path.join("output.html"),
                });
            } else {
                Self::discover_tests_recursive(&path, tests)?;
            }
        }

        Ok(())
    }

    pub fn run_test(&self, test: SnapshotTest) -> SnapshotResult {
        let result = match self.execute_test(&test) {
            Ok(result) => result,
            Err(e) => {
                return SnapshotResult {
                    test,
                    actual_response: String::new(),
                    expected_response: None,
                    error: Some(e.to_string()),
                    actual_output: None,
                    expected_output: None,
                    response_matches: false,
                    output_matches: false,
                };
            }
        };
        if self.update_mode {
            self.update_snapshot(result, test)
        } else {
            self.compare_snapshot(result, test)
        }
    }

    fn update_snapshot(&self, result: SnapshotExecutionResult, test: SnapshotTest) -> SnapshotResult {
        let SnapshotExecutionResult { response, output } = result;
        let mut result = SnapshotResult {
            test,
            actual_response: response,
            expected_response: None,
            actual_output: output,
            expected_output: None,
            error: None,
            response_matches: true,
            output_matches: true,
        };

        if let Err(e) = fs::write(&result.test.response_path, &result.actual_response) {
            result.error = Some(format!("Failed to write expected response: {e}"));
            return result;
        }

        match &result.actual_output {
            Some(output) => {
                if let Err(e) = fs::write(&result.test.output_path, output) {
                    result.error = Some(format!("Failed to write expected output: {e}"));
                }
            }
            None => {
                if let Ok(true) = result.test.output_path.try_exists() {
                    if let Err(e) = fs::remove_file(&result.test.output_path) {
                        result.error =
                            Some(format!("No output expected, but was unable to delete: {e}"));
                    }
                }
            }
        }

        result
    }

    fn compare_snapshot(
        &self,
        result: SnapshotExecutionResult,
        test: SnapshotTest,
    ) -> SnapshotResult {
        let SnapshotExecutionResult { response, output } = result;
        let mut result = SnapshotResult {
            test,
            actual_response: response,
            expected_response: None,
            actual_output: output,
            expected_output: None,
            error: None,
            response_matches: false,
            output_matches: false,
        };

        match fs::read_to_string(&result.test.response_path) {
            Ok(content) => result.expected_response = Some(content),
            Err(_) => {
                result.error = Some(
                    "Response file not found. Run with UPDATE_SNAPSHOTS=1 to create it."
                        .to_string(),
                );
                return result;
            }
        }
        result.expected_output = fs::read_to_string(&result.test.output_path).ok();

        result.response_matches = result
            .expected_response
            .as_deref()
            .is_some_and(|expected| expected.trim() == result.actual_response.trim());

        result.output_matches = match (
            result.actual_output.as_deref(),
            result.expected_output.as_deref(),
        ) {
            (Some(actual), Some(expected)) => actual.trim() == expected.trim(),
            (None, None) => true,
            _ => false,
        };

        result
    }

    fn execute_test(&self, test: &SnapshotTest) -> Result<SnapshotExecutionResult> {
        let document = fs::read_to_string(&test.input_path)
            .map_err(|e| anyhow!("could not read {}: {e}", test.input_path.display()))?;
        let operations: Value = serde_json::from_str(&fs::read_to_string(&test.operations_path)?)?;
        let options: PatchOptions = match fs::read_to_string(&test.options_path) {
            Ok(options) => serde_json::from_str(&options)?,
            Err(_) => PatchOptions::default(),
        };

        let result = match Patcher::new(options).apply(&document, &operations) {
            Ok(outcome) => {
                let mut response = outcome.to_string();
                let preview = outcome.preview(&document);
                if !preview.is_empty() {
                    response.push_str("\n\n");
                    response.push_str(&preview);
                }
                SnapshotExecutionResult {
                    response,
                    output: Some(outcome.into_document()),
                }
            }
            Err(e) => SnapshotExecutionResult {
                response: format!("error: {e}"),
                output: None,
            },
        };

        Ok(result)
    }

    /// Run all discovered tests (filtered if TEST_FILTER is set)
    pub fn run_all_tests(&self) -> Result<Vec<SnapshotResult>> {
        let all_tests = self.discover_tests()?;
        let tests = self.filter_tests(all_tests);
        assert_ne!(tests.len(), 0);

        if let Some(filter) = &self.test_filter {
            println!("Running filtered tests: {filter}");
            println!("   Found {} matching test(s)", tests.len());
        }

        Ok(tests.into_iter().map(|test| self.run_test(test)).collect())
    }

    /// Print a summary of test results
    pub fn print_summary(&self, results: &[SnapshotResult]) {
        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.response_matches && r.output_matches)
            .count();
        let failed = total - passed;

        let mut diff_options = DiffOptions::new();
        diff_options.set_original_filename("expected");
        diff_options.set_modified_filename("actual");
        let f = PatchFormatter::new()
            .with_color()
            .missing_newline_message(false);

        println!("\n=== Snapshot Test Summary ===");
        println!("  Total:  {total}");
        println!("  Passed: {passed}");
        println!("  Failed: {failed}");

        if self.update_mode {
            println!("  Mode:   UPDATE (expected outputs written)");
        } else {
            println!("  Mode:   VERIFY");
        }

        if let Some(filter) = &self.test_filter {
            println!("  Filter: {filter}");
        }

        if passed > 0 {
            println!("\nPassed tests:");
            for result in results
                .iter()
                .filter(|r| r.response_matches && r.output_matches)
            {
                println!("  • {}", result.test.name);
            }
        }

        if failed == 0 {
            return;
        }

        println!("\nFailed tests:");
        for result in results
            .iter()
            .filter(|r| !r.response_matches || !r.output_matches)
        {
            println!("  • {}", result.test.name);
        }

        println!("\n\n=== Failed tests details ===\n");

        for result in results
            .iter()
            .filter(|r| !r.response_matches || !r.output_matches)
        {
            println!("✗ {}", result.test.name);
            println!(
                "To target just this test, run `TEST_FILTER={} cargo test`",
                result.test.name
            );
            println!(
                "To update snapshot for just this test, run `UPDATE_SNAPSHOTS=1 TEST_FILTER={} cargo test`",
                result.test.name
            );
            if let Some(error) = &result.error {
                println!("Error:\n{error}");
            } else {
                if !result.response_matches {
                    println!("Expected response differs from actual response");
                    let expected_response = result.expected_response.as_deref().unwrap_or_default();
                    let patch = diff_options.create_patch(expected_response, &result.actual_response);
                    println!("\n***RESPONSE DIFF***\n\n{}", f.fmt_patch(&patch));
                }

                if !result.output_matches {
                    println!("Expected output differs from actual output");
                    let expected_output = result.expected_output.as_deref().unwrap_or_default();
                    let actual_output = result.actual_output.as_deref().unwrap_or_default();
                    let patch = diff_options.create_patch(expected_output, actual_output);
                    println!("\n***OUTPUT DIFF***\n\n{}", f.fmt_patch(&patch));
                }
            }

            println!("\n\n");
        }
    }
}
