//! Template request parsing

use crate::error::{ApiError, Result};
use pushboard_store::TemplateInput;
use serde_json::Value;

/// Parse a create/update request body.
///
/// An empty body (or `null`) becomes an empty input, which the store rejects
/// once it has checked that the target exists. Anything that is not a JSON
/// object is a bad request.
pub fn parse_template_input(body: &[u8]) -> Result<TemplateInput> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TemplateInput::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(&format!("Invalid JSON: {}", e)))?;

    match value {
        Value::Null => Ok(TemplateInput::default()),
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| ApiError::bad_request(&format!("Invalid template fields: {}", e))),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}
