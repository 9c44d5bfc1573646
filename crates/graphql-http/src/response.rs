use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

use crate::{ExecutionOutcome, GraphqlError, JsonMap};

/// One outcome, ready to be aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResponse {
    pub status_code: StatusCode,
    /// `None` for suppressed requests.
    pub body: Option<Value>,
}

/// Maps an outcome to its response body.
///
/// GraphQL errors are reported in-band, the status code is always `200 OK`. Errors take the
/// place of `data` when present.
pub fn format_execution_result<F>(outcome: &ExecutionOutcome, format_error: F) -> EncodedResponse
where
    F: Fn(&GraphqlError) -> Value,
{
    let body = match outcome {
        ExecutionOutcome::Executed(result) if !result.errors.is_empty() => {
            let errors = result.errors.iter().map(format_error).collect();
            Some(object([("errors", Value::Array(errors))]))
        }
        ExecutionOutcome::Executed(result) => Some(object([("data", result.data.clone().unwrap_or_default())])),
        ExecutionOutcome::Suppressed => None,
    };

    EncodedResponse {
        status_code: StatusCode::OK,
        body,
    }
}

/// Reduces all outcomes to one body and one status code, the highest of all outcomes.
///
/// The body is a list aligned with the outcomes for batches, the body of the only outcome
/// otherwise. `encode` is called exactly once, on the final body.
pub fn encode_execution_results<F, E, T>(
    outcomes: &[ExecutionOutcome],
    format_error: F,
    is_batch: bool,
    encode: E,
) -> (T, StatusCode)
where
    F: Fn(&GraphqlError) -> Value,
    E: FnOnce(&Value) -> T,
{
    let responses: Vec<EncodedResponse> = outcomes
        .iter()
        .map(|outcome| format_execution_result(outcome, &format_error))
        .collect();

    let status_code = responses
        .iter()
        .map(|response| response.status_code)
        .max_by_key(|status_code| status_code.as_u16())
        .unwrap_or(StatusCode::OK);

    let mut bodies = responses.into_iter().map(|response| response.body.unwrap_or_default());

    let body = if is_batch {
        Value::Array(bodies.collect())
    } else {
        bodies.next().unwrap_or_default()
    };

    (encode(&body), status_code)
}

/// The default error format: `message`, and `locations`, `path` and `extensions` when not empty.
pub fn default_format_error(error: &GraphqlError) -> Value {
    let mut formatted = JsonMap::new();
    formatted.insert("message".into(), error.message.clone().into());

    if !error.locations.is_empty() {
        let locations = error
            .locations
            .iter()
            .map(|location| object([("line", location.line.into()), ("column", location.column.into())]))
            .collect();
        formatted.insert("locations".into(), Value::Array(locations));
    }

    if !error.path.is_empty() {
        let path = error
            .path
            .iter()
            .map(|segment| match segment {
                crate::PathSegment::Field(name) => Value::from(name.as_str()),
                crate::PathSegment::Index(index) => Value::from(*index),
            })
            .collect();
        formatted.insert("path".into(), Value::Array(path));
    }

    if !error.extensions.is_empty() {
        formatted.insert("extensions".into(), Value::Object(error.extensions.clone()));
    }

    Value::Object(formatted)
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(entries.into_iter().map(|(key, value)| (key.to_string(), value)).collect())
}

/// Serializes response bodies as compact or indented JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JsonEncoder {
    pub pretty: bool,
}

impl JsonEncoder {
    pub fn new(pretty: bool) -> Self {
        JsonEncoder { pretty }
    }

    pub fn encode(&self, body: &Value) -> serde_json::Result<Bytes> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(body)?
        } else {
            serde_json::to_vec(body)?
        };

        Ok(bytes.into())
    }
}
