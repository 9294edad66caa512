pub mod config;
pub mod dispatcher;
pub mod document;
pub mod errors;
mod handlers;
pub mod operation;
pub mod planner;
pub mod preview;
pub mod selector;
pub mod traits;
pub mod types;
pub mod validation;

pub use config::{ParseMode, ParseOptions, PatchOptions};
pub use dispatcher::{apply, apply_operations, Outcome, Patcher, Warning, WarningKind};
pub use document::Document;
pub use errors::{
    HandlerError, ParseError, PatchError, PlannerResponseError, SelectorError, ValidationError,
};
pub use operation::{ClassAction, Operation, OperationKind, VisibilityAction};
pub use planner::decode_planner_response;
pub use selector::Selector;
pub use types::{ApplyRequest, ApplyResponse};
