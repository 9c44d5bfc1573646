use serde_json::Value;

use crate::{HttpQueryError, JsonMap};

use super::is_truthy;

/// Decodes the `variables` of a request, sent either as JSON text (query strings, form posts) or
/// as an already structured JSON object.
///
/// Falsy values mean "no variables". A string that isn't valid JSON is a structural error: there
/// is no meaningful way to execute an operation with variables we cannot read.
pub fn decode_variables(raw: Option<Value>) -> Result<Option<JsonMap>, HttpQueryError> {
    match raw {
        Some(Value::String(text)) if !text.is_empty() => {
            let decoded = serde_json::from_str::<Value>(&text)
                .map_err(|_| HttpQueryError::invalid_input("Variables are invalid JSON."))?;

            into_variables(decoded)
        }
        Some(value) => into_variables(value),
        None => Ok(None),
    }
}

fn into_variables(value: Value) -> Result<Option<JsonMap>, HttpQueryError> {
    match value {
        Value::Object(variables) => Ok(Some(variables)),
        value if !is_truthy(&value) => Ok(None),
        _ => Err(HttpQueryError::invalid_input("Variables must be a JSON object.")),
    }
}
