use async_graphql_parser::types::{ExecutableDocument, OperationType};

use crate::{
    document::{get_operation, operation_type_name},
    Engine, ExecutionRequest, ExecutionResult, GraphqlParams, HttpQueryError,
};

/// What became of one request of a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The engine was reached. GraphQL errors, if any, are part of the result.
    Executed(ExecutionResult),
    /// A structural error was contained. Rendered as `null` so that batch responses stay aligned
    /// with their payload.
    Suppressed,
}

/// Runs one request through the engine.
///
/// Fails with an [`HttpQueryError`] only if the request cannot be dispatched at all: a missing
/// query, or a mutation or subscription sent with `allow_only_query`. Syntax and validation
/// errors are GraphQL errors and are returned in the result instead.
pub async fn execute_graphql_request<E>(
    engine: &E,
    params: &GraphqlParams,
    allow_only_query: bool,
) -> Result<ExecutionResult, HttpQueryError>
where
    E: Engine + ?Sized,
{
    Ok(prepare_graphql_request(engine, params, allow_only_query)?
        .execute(engine)
        .await)
}

/// A request that passed every structural check and only waits for the engine.
pub(crate) enum PreparedRequest<'a> {
    /// Parsing or validation already produced the result.
    Answered(ExecutionResult),
    Ready {
        query: &'a str,
        document: ExecutableDocument,
        params: &'a GraphqlParams,
    },
}

/// Parses and validates a request without executing it.
pub(crate) fn prepare_graphql_request<'a, E>(
    engine: &E,
    params: &'a GraphqlParams,
    allow_only_query: bool,
) -> Result<PreparedRequest<'a>, HttpQueryError>
where
    E: Engine + ?Sized,
{
    let Some(query) = params.query.as_deref().filter(|query| !query.is_empty()) else {
        return Err(HttpQueryError::invalid_input("Must provide query string."));
    };

    let document = match engine.parse(query) {
        Ok(document) => document,
        Err(error) => return Ok(PreparedRequest::Answered(ExecutionResult::errors([error]))),
    };

    if allow_only_query {
        if let Some(operation) = get_operation(&document, params.operation_name.as_deref()) {
            if operation.node.ty != OperationType::Query {
                return Err(HttpQueryError::method_not_allowed(
                    format!(
                        "Can only perform a {} operation from a POST request.",
                        operation_type_name(operation.node.ty)
                    ),
                    "POST",
                ));
            }
        }
    }

    let validation_errors = engine.validate(&document);
    if !validation_errors.is_empty() {
        return Ok(PreparedRequest::Answered(ExecutionResult::errors(validation_errors)));
    }

    Ok(PreparedRequest::Ready {
        query,
        document,
        params,
    })
}

impl PreparedRequest<'_> {
    pub(crate) async fn execute<E>(self, engine: &E) -> ExecutionResult
    where
        E: Engine + ?Sized,
    {
        match self {
            PreparedRequest::Answered(result) => result,
            PreparedRequest::Ready {
                query,
                document,
                params,
            } => {
                let request = ExecutionRequest {
                    query,
                    document: &document,
                    variables: params.variables.as_ref(),
                    operation_name: params.operation_name.as_deref(),
                };

                engine.execute(request).await
            }
        }
    }
}
