//! The GraphQL engine seam: parsing, validation and execution against a schema.

mod schema;

use async_graphql_parser::types::ExecutableDocument;

use crate::{GraphqlError, JsonMap};

/// A GraphQL engine bound to its schema.
///
/// The engine is shared between all the items of a batch, which may execute concurrently, so
/// implementations must be safe to call re-entrantly.
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    fn parse(&self, query: &str) -> Result<ExecutableDocument, GraphqlError> {
        crate::parse(query)
    }

    /// Validates a parsed document against the schema, an empty list meaning the document is
    /// valid.
    fn validate(&self, document: &ExecutableDocument) -> Vec<GraphqlError>;

    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionResult;
}

/// Everything the engine needs to execute one validated request.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub query: &'a str,
    pub document: &'a ExecutableDocument,
    pub variables: Option<&'a JsonMap>,
    pub operation_name: Option<&'a str>,
}

/// The result of an execution: `data` may be absent and `errors` empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub data: Option<serde_json::Value>,
    pub errors: Vec<GraphqlError>,
}

impl ExecutionResult {
    pub fn data(data: impl Into<serde_json::Value>) -> Self {
        ExecutionResult {
            data: Some(data.into()),
            errors: Vec::new(),
        }
    }

    /// A result without data, as produced by parsing or validation failures.
    pub fn errors(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        ExecutionResult {
            data: None,
            errors: errors.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl<E: Engine + ?Sized> Engine for std::sync::Arc<E> {
    fn parse(&self, query: &str) -> Result<ExecutableDocument, GraphqlError> {
        (**self).parse(query)
    }

    fn validate(&self, document: &ExecutableDocument) -> Vec<GraphqlError> {
        (**self).validate(document)
    }

    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionResult {
        (**self).execute(request).await
    }
}
