use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatcher::{Outcome, Warning};
use crate::errors::PatchError;

/// One line of input to `html-patch serve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub document: String,
    /// Left untyped so that validation can report the offending index.
    pub operations: Value,
}

/// Wire shape of an `apply` result.
///
/// `{"success": true, "document", "attempted", "warnings"}` on success and
/// `{"success": false, "error"}` (plus `index` for validation faults) on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<Warning>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl ApplyResponse {
    pub fn failure(error: impl ToString, index: Option<usize>) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            index,
            ..Self::default()
        }
    }
}

impl From<Outcome> for ApplyResponse {
    fn from(outcome: Outcome) -> Self {
        let attempted = outcome.attempted();
        let warnings = outcome.warnings().to_vec();
        Self {
            success: true,
            document: Some(outcome.into_document()),
            attempted: Some(attempted),
            warnings: Some(warnings),
            ..Self::default()
        }
    }
}

impl From<PatchError> for ApplyResponse {
    fn from(error: PatchError) -> Self {
        let index = match &error {
            PatchError::Validation(validation) => validation.index(),
            PatchError::Parse(_) => None,
        };
        Self::failure(error, index)
    }
}

impl From<Result<Outcome, PatchError>> for ApplyResponse {
    fn from(result: Result<Outcome, PatchError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(error) => error.into(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct Example<T> {
    pub description: &'static str,
    #[serde(flatten)]
    pub item: T,
}
