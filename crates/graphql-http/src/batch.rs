use futures::future::join_all;
use http::Method;
use serde_json::Value;

use crate::{
    execute::{prepare_graphql_request, ExecutionOutcome},
    request::HttpQuery,
    Engine, GraphqlParams, HttpQueryConfig, HttpQueryError, QueryParams,
};

/// The outcomes of a payload, aligned with the requests it contained.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResults {
    pub is_batch: bool,
    pub outcomes: Vec<ExecutionOutcome>,
    pub params: Vec<GraphqlParams>,
}

/// Runs a GraphQL-over-HTTP payload, `data`, received with `method`.
///
/// `query_data` holds the parameters found outside of the body and only applies if `data` is a
/// single request. Requests of a batch are executed concurrently. Without error containment a
/// structural error in any request aborts the whole payload before anything is executed, with
/// it the failing request becomes [`ExecutionOutcome::Suppressed`].
pub async fn run_http_query<E>(
    engine: &E,
    method: &Method,
    data: Value,
    query_data: QueryParams,
    config: &HttpQueryConfig,
) -> Result<QueryResults, HttpQueryError>
where
    E: Engine + ?Sized,
{
    if *method != Method::GET && *method != Method::POST {
        return Err(HttpQueryError::method_not_allowed(
            "GraphQL only supports GET and POST requests.",
            "GET, POST",
        ));
    }

    let query = HttpQuery::new(data, query_data)?;
    let is_batch = query.is_batch();

    if is_batch && !config.batching {
        return Err(HttpQueryError::invalid_input("Batch GraphQL requests are not enabled."));
    }

    if query.is_empty() {
        return Err(HttpQueryError::invalid_input(
            "Received an empty list in the batch request.",
        ));
    }

    let all_params = query.into_params()?;
    let allow_only_query = *method == Method::GET;

    tracing::debug!(is_batch, count = all_params.len(), "Executing GraphQL requests");

    // Every item is checked before the engine executes any of them.
    let prepared = all_params
        .iter()
        .map(|params| prepare_graphql_request(engine, params, allow_only_query));

    let outcomes = if config.contain_errors {
        join_all(prepared.map(|prepared| async move {
            match prepared {
                Ok(request) => ExecutionOutcome::Executed(request.execute(engine).await),
                Err(error) => {
                    tracing::debug!("Suppressed request error: {error}");
                    ExecutionOutcome::Suppressed
                }
            }
        }))
        .await
    } else {
        let prepared = prepared.collect::<Result<Vec<_>, _>>()?;

        join_all(
            prepared
                .into_iter()
                .map(|request| async move { ExecutionOutcome::Executed(request.execute(engine).await) }),
        )
        .await
    };

    Ok(QueryResults {
        is_batch,
        outcomes,
        params: all_params,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_graphql_parser::types::ExecutableDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{ExecutionRequest, ExecutionResult, GraphqlError};

    /// Answers every query with its own text.
    struct QueryEngine;

    #[async_trait::async_trait]
    impl Engine for QueryEngine {
        fn validate(&self, _document: &ExecutableDocument) -> Vec<GraphqlError> {
            Vec::new()
        }

        async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionResult {
            ExecutionResult::data(json!({"query": request.query}))
        }
    }

    /// Counts executions. `slow` queries yield to the runtime first, staying pending on their
    /// first poll.
    #[derive(Default)]
    struct CountingEngine {
        executions: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Engine for CountingEngine {
        fn validate(&self, _document: &ExecutableDocument) -> Vec<GraphqlError> {
            Vec::new()
        }

        async fn execute(&self, request: ExecutionRequest<'_>) -> ExecutionResult {
            if request.query.contains("slow") {
                tokio::task::yield_now().await;
            }
            self.executions.fetch_add(1, Ordering::SeqCst);
            ExecutionResult::data(json!({}))
        }
    }

    fn batching(contain_errors: bool) -> HttpQueryConfig {
        HttpQueryConfig {
            batching: true,
            contain_errors,
            pretty: false,
        }
    }

    fn executed(query: &str) -> ExecutionOutcome {
        ExecutionOutcome::Executed(ExecutionResult::data(json!({"query": query})))
    }

    #[tokio::test]
    async fn only_get_and_post_are_supported() {
        for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
            let error = run_http_query(
                &QueryEngine,
                &method,
                json!({"query": "{ a }"}),
                QueryParams::default(),
                &HttpQueryConfig::default(),
            )
            .await
            .unwrap_err();

            assert_eq!(error.status_code(), http::StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(error.headers().get(http::header::ALLOW).unwrap(), "GET, POST");
            assert_eq!(error.message(), "GraphQL only supports GET and POST requests.");
        }
    }

    #[tokio::test]
    async fn single_request() {
        let fallback = QueryParams {
            query: Some("{ fallback }".into()),
            ..Default::default()
        };

        let results = run_http_query(
            &QueryEngine,
            &Method::GET,
            json!({}),
            fallback,
            &HttpQueryConfig::default(),
        )
        .await
        .unwrap();

        assert!(!results.is_batch);
        assert_eq!(results.outcomes, vec![executed("{ fallback }")]);
        assert_eq!(results.params[0].query.as_deref(), Some("{ fallback }"));
    }

    #[tokio::test]
    async fn batches_must_be_enabled() {
        for data in [json!([]), json!([{"query": "{ a }"}]), json!([1, 2])] {
            let error = run_http_query(
                &QueryEngine,
                &Method::POST,
                data,
                QueryParams::default(),
                &HttpQueryConfig::default(),
            )
            .await
            .unwrap_err();

            assert_eq!(error, HttpQueryError::invalid_input("Batch GraphQL requests are not enabled."));
        }
    }

    #[tokio::test]
    async fn empty_batch() {
        let error = run_http_query(
            &QueryEngine,
            &Method::POST,
            json!([]),
            QueryParams::default(),
            &batching(true),
        )
        .await
        .unwrap_err();

        assert_eq!(
            error,
            HttpQueryError::invalid_input("Received an empty list in the batch request.")
        );
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let queries: Vec<String> = (0..20).map(|i| format!("{{ field{i} }}")).collect();
        let data = Value::Array(queries.iter().map(|query| json!({"query": query})).collect());

        let results = run_http_query(&QueryEngine, &Method::POST, data, QueryParams::default(), &batching(false))
            .await
            .unwrap();

        assert!(results.is_batch);
        assert_eq!(
            results.outcomes,
            queries.iter().map(|query| executed(query)).collect::<Vec<_>>()
        );
        assert_eq!(results.params.len(), 20);
    }

    #[tokio::test]
    async fn contained_errors_become_suppressed() {
        let data = json!([
            {"query": "{ a }"},
            {},
            {"query": "mutation { b }"},
            {"query": "{ c }"}
        ]);

        let results = run_http_query(&QueryEngine, &Method::GET, data, QueryParams::default(), &batching(true))
            .await
            .unwrap();

        assert_eq!(
            results.outcomes,
            vec![
                executed("{ a }"),
                ExecutionOutcome::Suppressed,
                ExecutionOutcome::Suppressed,
                executed("{ c }"),
            ]
        );
    }

    #[tokio::test]
    async fn uncontained_errors_abort_the_batch() {
        let data = json!([{"query": "{ a }"}, {}, {"query": "{ c }"}]);

        let error = run_http_query(&QueryEngine, &Method::POST, data, QueryParams::default(), &batching(false))
            .await
            .unwrap_err();

        assert_eq!(error, HttpQueryError::invalid_input("Must provide query string."));
    }

    #[tokio::test]
    async fn refused_items_keep_the_whole_batch_from_executing() {
        let mut items = vec![json!({"query": "{ slow }"}), json!({})];
        items.extend((0..38).map(|_| json!({"query": "mutation { after }"})));

        let engine = CountingEngine::default();
        let error = run_http_query(
            &engine,
            &Method::POST,
            Value::Array(items),
            QueryParams::default(),
            &batching(false),
        )
        .await
        .unwrap_err();

        assert_eq!(error, HttpQueryError::invalid_input("Must provide query string."));
        assert_eq!(engine.executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn late_mutation_over_get_keeps_the_batch_from_executing() {
        let mut items: Vec<Value> = (0..35).map(|_| json!({"query": "{ slow }"})).collect();
        items.push(json!({"query": "mutation { after }"}));

        let engine = CountingEngine::default();
        let error = run_http_query(
            &engine,
            &Method::GET,
            Value::Array(items),
            QueryParams::default(),
            &batching(false),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status_code(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(engine.executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn contained_batch_executes_the_valid_items() {
        let mut items = vec![json!({"query": "{ slow }"}), json!({})];
        items.extend((0..38).map(|_| json!({"query": "{ after }"})));

        let engine = CountingEngine::default();
        let results = run_http_query(
            &engine,
            &Method::POST,
            Value::Array(items),
            QueryParams::default(),
            &batching(true),
        )
        .await
        .unwrap();

        assert_eq!(results.outcomes.len(), 40);
        assert_eq!(results.outcomes[1], ExecutionOutcome::Suppressed);
        assert_eq!(engine.executions.load(Ordering::SeqCst), 39);
    }

    #[tokio::test]
    async fn extraction_errors_are_never_contained() {
        let data = json!([{"query": "{ a }"}, {"query": "{ b }", "variables": "{"}]);

        let error = run_http_query(&QueryEngine, &Method::POST, data, QueryParams::default(), &batching(true))
            .await
            .unwrap_err();

        assert_eq!(error, HttpQueryError::invalid_input("Variables are invalid JSON."));
    }

    #[tokio::test]
    async fn single_request_errors_can_be_contained() {
        let results = run_http_query(
            &QueryEngine,
            &Method::GET,
            json!({"query": "mutation { a }"}),
            QueryParams::default(),
            &batching(true),
        )
        .await
        .unwrap();

        assert!(!results.is_batch);
        assert_eq!(results.outcomes, vec![ExecutionOutcome::Suppressed]);
    }
}
