use async_graphql::{ObjectType, SubscriptionType, Variables};
use async_graphql_parser::types::ExecutableDocument;

use crate::{GraphqlError, Location, PathSegment};

use super::{Engine, ExecutionRequest, ExecutionResult};

/// async-graphql validates documents as part of `execute`, so validation errors come back
/// in-band with the execution result.
#[async_trait::async_trait]
impl<Q, M, S> Engine for async_graphql::Schema<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    fn validate(&self, _document: &ExecutableDocument) -> Vec<GraphqlError> {
        Vec::new()
    }

    async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionResult {
        let mut graphql_request = async_graphql::Request::new(request.query);

        if let Some(operation_name) = request.operation_name {
            graphql_request = graphql_request.operation_name(operation_name);
        }

        if let Some(variables) = request.variables {
            graphql_request =
                graphql_request.variables(Variables::from_json(serde_json::Value::Object(variables.clone())));
        }

        async_graphql::Schema::execute(self, graphql_request).await.into()
    }
}

impl From<async_graphql::Response> for ExecutionResult {
    fn from(response: async_graphql::Response) -> Self {
        let mut errors: Vec<GraphqlError> = response.errors.into_iter().map(GraphqlError::from).collect();

        let data = match response.data.into_json() {
            Ok(serde_json::Value::Null) => None,
            Ok(data) => Some(data),
            Err(err) => {
                tracing::error!("Failed to convert response data to JSON: {err}");
                errors.push(GraphqlError::new("Internal server error"));
                None
            }
        };

        ExecutionResult { data, errors }
    }
}

impl From<async_graphql::ServerError> for GraphqlError {
    fn from(error: async_graphql::ServerError) -> Self {
        let extensions = error
            .extensions
            .as_ref()
            .and_then(|extensions| serde_json::to_value(extensions).ok())
            .and_then(|extensions| match extensions {
                serde_json::Value::Object(extensions) => Some(extensions),
                _ => None,
            })
            .unwrap_or_default();

        GraphqlError {
            message: error.message,
            locations: error.locations.into_iter().map(Location::from).collect(),
            path: error
                .path
                .into_iter()
                .map(|segment| match segment {
                    async_graphql::PathSegment::Field(name) => PathSegment::Field(name),
                    async_graphql::PathSegment::Index(index) => PathSegment::Index(index),
                })
                .collect(),
            extensions,
        }
    }
}
