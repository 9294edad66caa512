//! Turning a planner reply into operations.
//!
//! Planners are prompted for a bare JSON array but regularly wrap it in a
//! Markdown code fence. An empty array is their way of saying the request is
//! too broad for operation mode and the document should be regenerated.

use serde_json::Value;

use crate::errors::PlannerResponseError;
use crate::operation::Operation;
use crate::validation;

/// Removes a surrounding Markdown code fence (```` ```json ````, ```` ```html ````
/// or a bare ```` ``` ````) along with surrounding whitespace.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut content = reply.trim();

    if let Some(rest) = content.strip_prefix("```") {
        let info_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        content = rest[info_len..].trim_start();
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest.trim_end();
    }

    content.trim()
}

/// Decodes and validates a planner reply.
pub fn decode_planner_response(reply: &str) -> Result<Vec<Operation>, PlannerResponseError> {
    let content = strip_code_fence(reply);
    if content.is_empty() {
        return Err(PlannerResponseError::Empty);
    }

    let value: Value = serde_json::from_str(content)?;
    match &value {
        Value::Array(items) if items.is_empty() => Err(PlannerResponseError::FallbackNeeded),
        Value::Array(_) => Ok(validation::validate(&value)?),
        _ => Err(PlannerResponseError::NotAnArray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::VisibilityAction;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  ```html\n<p>x</p>```  "), "<p>x</p>");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("[2]"), "[2]");
    }

    #[test]
    fn fenced_reply_decodes() {
        let reply = "```json\n[{\"type\": \"visibility_toggle\", \"selector\": \".ad\", \"action\": \"hide\"}]\n```";
        assert_eq!(
            decode_planner_response(reply).unwrap(),
            [Operation::visibility_toggle(".ad", VisibilityAction::Hide)]
        );
    }

    #[test]
    fn empty_array_requests_fallback() {
        assert!(matches!(
            decode_planner_response("```json\n[]\n```"),
            Err(PlannerResponseError::FallbackNeeded)
        ));
    }

    #[test]
    fn rejected_replies() {
        assert!(matches!(
            decode_planner_response("   "),
            Err(PlannerResponseError::Empty)
        ));
        assert!(matches!(
            decode_planner_response("Sure! Here are the operations"),
            Err(PlannerResponseError::Json(_))
        ));
        assert!(matches!(
            decode_planner_response(r#"{"kind": "text_replace"}"#),
            Err(PlannerResponseError::NotAnArray)
        ));
        assert!(matches!(
            decode_planner_response(r#"[{"kind": "text_replace", "selector": "p"}]"#),
            Err(PlannerResponseError::Invalid(_))
        ));
    }
}
