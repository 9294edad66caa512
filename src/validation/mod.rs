use std::str::FromStr;

use serde_json::{Map, Value};
use strum::VariantNames;

use crate::errors::ValidationError;
use crate::operation::{Operation, OperationKind};

/// Checks a raw instruction list and converts it into typed operations.
///
/// Stops at the first violation. No document or selector work happens here.
pub fn validate(operations: &Value) -> Result<Vec<Operation>, ValidationError> {
    validate_with_limit(operations, None)
}

/// Like [`validate`], additionally rejecting the first operation past `max_operations`.
pub fn validate_with_limit(
    operations: &Value,
    max_operations: Option<usize>,
) -> Result<Vec<Operation>, ValidationError> {
    let Value::Array(items) = operations else {
        return Err(ValidationError::NotASequence(json_type(operations)));
    };

    let mut validated = Vec::with_capacity(items.len());
    for (offset, item) in items.iter().enumerate() {
        let index = offset + 1;
        if let Some(limit) = max_operations.filter(|&limit| index > limit) {
            return Err(ValidationError::at(index, over_limit(limit)));
        }
        let operation = validate_one(item).map_err(|reason| ValidationError::at(index, reason))?;
        validated.push(operation);
    }

    log::debug!("validated {} operation(s)", validated.len());
    Ok(validated)
}

/// Applies the field rules to operations that were built as typed values.
pub fn check_operations(
    operations: &[Operation],
    max_operations: Option<usize>,
) -> Result<(), ValidationError> {
    for (offset, operation) in operations.iter().enumerate() {
        let index = offset + 1;
        if let Some(limit) = max_operations.filter(|&limit| index > limit) {
            return Err(ValidationError::at(index, over_limit(limit)));
        }
        operation
            .check()
            .map_err(|reason| ValidationError::at(index, reason))?;
    }
    Ok(())
}

fn over_limit(limit: usize) -> String {
    format!("at most {limit} operations are allowed in one batch")
}

fn validate_one(item: &Value) -> Result<Operation, String> {
    let Value::Object(fields) = item else {
        return Err(format!("expected an object, got {}", json_type(item)));
    };

    let (tag, kind) = match (fields.get("kind"), fields.get("type")) {
        (Some(_), Some(_)) => return Err("use either `kind` or `type`, not both".into()),
        (Some(kind), None) => ("kind", kind),
        (None, Some(kind)) => ("type", kind),
        (None, None) => return Err("missing required field `kind`".into()),
    };
    let kind = kind
        .as_str()
        .ok_or_else(|| format!("`{tag}` must be a string, got {}", json_type(kind)))?;
    let kind = OperationKind::from_str(kind).map_err(|_| {
        format!(
            "unknown kind `{kind}`, expected one of: {}",
            OperationKind::VARIANTS.join(", ")
        )
    })?;

    let selector = required_string(fields, kind, "selector")?;
    if selector.trim().is_empty() {
        return Err("`selector` must not be empty".into());
    }

    let allowed = kind.fields();
    if let Some(unknown) = fields
        .keys()
        .find(|name| name.as_str() != tag && !allowed.contains(&name.as_str()))
    {
        return Err(format!("{kind} does not take field `{unknown}`"));
    }
    for &field in allowed {
        required_string(fields, kind, field)?;
    }

    if let (Some(actions), Some(action)) = (kind.actions(), fields.get("action")) {
        let action = action.as_str().unwrap_or_default();
        if !actions.contains(&action) {
            return Err(format!(
                "`action` must be one of {} for {kind}, got `{action}`",
                actions.join(" or ")
            ));
        }
    }

    let mut normalized = fields.clone();
    normalized.remove(tag);
    normalized.insert("kind".into(), Value::String(kind.to_string()));
    let operation: Operation =
        serde_json::from_value(Value::Object(normalized)).map_err(|error| error.to_string())?;
    operation.check()?;
    Ok(operation)
}

fn required_string<'a>(
    fields: &'a Map<String, Value>,
    kind: OperationKind,
    field: &str,
) -> Result<&'a str, String> {
    match fields.get(field) {
        None => Err(format!("{kind} is missing required field `{field}`")),
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(format!(
            "`{field}` must be a string, got {}",
            json_type(other)
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
