//! Extraction of GraphQL parameters from GraphQL-over-HTTP payloads.

mod variables;

pub use variables::decode_variables;

use serde_json::Value;

use crate::{HttpQueryError, JsonMap};

/// The normalized parameters of one GraphQL request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphqlParams {
    pub query: Option<String>,
    pub variables: Option<JsonMap>,
    pub operation_name: Option<String>,
}

/// GraphQL parameters found outside of the request body, typically in the URL query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub query: Option<String>,
    /// Either JSON text or an already decoded object.
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
}

impl QueryParams {
    pub fn from_query_string(query: &str) -> Result<Self, HttpQueryError> {
        let RawQueryParams {
            query,
            variables,
            operation_name,
        } = serde_urlencoded::from_str(query).map_err(|err| {
            HttpQueryError::invalid_input(format!(
                "Could not deserialize request from query parameters: {err}"
            ))
        })?;

        Ok(QueryParams {
            query,
            variables: variables.map(Value::String),
            operation_name,
        })
    }
}

#[derive(serde::Deserialize)]
struct RawQueryParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    variables: Option<String>,
    #[serde(default, rename = "operationName")]
    operation_name: Option<String>,
}

/// An inbound payload, classified once at intake.
///
/// Only a [`SingleRequest`] can carry [`QueryParams`]: with several operations in one payload it
/// would be ambiguous which one the query string applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpQuery {
    Single(SingleRequest),
    Batch(BatchRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleRequest {
    body: JsonMap,
    fallback: QueryParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    items: Vec<Value>,
}

impl HttpQuery {
    /// Classifies a decoded body. Arrays are batches, objects are single requests and anything
    /// else is rejected.
    pub fn new(data: Value, query_data: QueryParams) -> Result<Self, HttpQueryError> {
        match data {
            Value::Array(items) => Ok(HttpQuery::Batch(BatchRequest { items })),
            Value::Object(body) => Ok(HttpQuery::Single(SingleRequest {
                body,
                fallback: query_data,
            })),
            data => Err(not_an_object(&data)),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, HttpQuery::Batch(_))
    }

    pub fn len(&self) -> usize {
        match self {
            HttpQuery::Single(_) => 1,
            HttpQuery::Batch(batch) => batch.items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extracts the parameters of every request, in payload order.
    pub fn into_params(self) -> Result<Vec<GraphqlParams>, HttpQueryError> {
        match self {
            HttpQuery::Single(request) => Ok(vec![request.into_params()?]),
            HttpQuery::Batch(batch) => batch.into_params(),
        }
    }
}

impl SingleRequest {
    pub fn into_params(self) -> Result<GraphqlParams, HttpQueryError> {
        let SingleRequest { body, fallback } = self;
        extract(body, fallback)
    }
}

impl BatchRequest {
    pub fn into_params(self) -> Result<Vec<GraphqlParams>, HttpQueryError> {
        self.items
            .into_iter()
            .map(|item| match item {
                Value::Object(body) => extract(body, QueryParams::default()),
                item => Err(not_an_object(&item)),
            })
            .collect()
    }
}

/// Body values win over the fallback whenever they are truthy.
fn extract(mut body: JsonMap, fallback: QueryParams) -> Result<GraphqlParams, HttpQueryError> {
    let query = non_empty_string(body.remove("query")).or_else(|| fallback.query.filter(|query| !query.is_empty()));

    let variables = body.remove("variables").filter(is_truthy).or(fallback.variables);

    let operation_name = non_empty_string(body.remove("operationName"))
        .or_else(|| fallback.operation_name.filter(|name| !name.is_empty()));

    Ok(GraphqlParams {
        query,
        variables: decode_variables(variables)?,
        operation_name,
    })
}

fn non_empty_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(value)) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(values) => !values.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn not_an_object(data: &Value) -> HttpQueryError {
    HttpQueryError::invalid_input(format!("GraphQL params should be an object. Received {data}."))
}

/// Decodes a JSON request body.
pub fn load_json_body(body: &[u8]) -> Result<Value, HttpQueryError> {
    serde_json::from_slice(body).map_err(|_| HttpQueryError::invalid_input("POST body sent invalid JSON."))
}
