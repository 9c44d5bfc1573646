use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderValue, Method, StatusCode};
use serde_json::Value;

use crate::{
    default_format_error, encode_execution_results, load_json_body, run_http_query, Engine, GraphqlError,
    HttpQueryConfig, HttpQueryError, JsonEncoder, QueryParams, QueryResults,
};

/// Formats a GraphQL error for the `errors` of a response.
pub type FormatError = Arc<dyn Fn(&GraphqlError) -> Value + Send + Sync>;

/// Serves GraphQL-over-HTTP requests with an engine.
pub struct GraphqlServer<E> {
    engine: E,
    config: HttpQueryConfig,
    format_error: FormatError,
    encoder: JsonEncoder,
}

impl<E: Engine> GraphqlServer<E> {
    pub fn new(engine: E, config: HttpQueryConfig) -> Self {
        GraphqlServer {
            engine,
            config,
            format_error: Arc::new(default_format_error),
            encoder: JsonEncoder::new(config.pretty),
        }
    }

    #[must_use]
    pub fn with_error_formatter<F>(mut self, format_error: F) -> Self
    where
        F: Fn(&GraphqlError) -> Value + Send + Sync + 'static,
    {
        self.format_error = Arc::new(format_error);
        self
    }

    pub async fn run_http_query(
        &self,
        method: &Method,
        data: Value,
        query_data: QueryParams,
    ) -> Result<QueryResults, HttpQueryError> {
        run_http_query(&self.engine, method, data, query_data, &self.config).await
    }

    pub fn encode(&self, results: &QueryResults) -> serde_json::Result<(Bytes, StatusCode)> {
        let (body, status_code) = encode_execution_results(
            &results.outcomes,
            |error| (self.format_error)(error),
            results.is_batch,
            |body| self.encoder.encode(body),
        );

        Ok((body?, status_code))
    }

    /// Handles a whole HTTP request.
    ///
    /// The URL query string provides fallback parameters for single requests. A POST body is
    /// decoded as JSON, an empty one standing for `{}`.
    pub async fn handle(&self, request: http::Request<Bytes>) -> http::Response<Bytes> {
        match self.run_request(request).await {
            Ok(results) => match self.encode(&results) {
                Ok((body, status_code)) => json_response(status_code, body),
                Err(err) => {
                    tracing::warn!("Failed to serialize GraphQL response: {err}");
                    json_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Bytes::from_static(br#"{"errors":[{"message":"Internal server error"}]}"#),
                    )
                }
            },
            Err(error) => {
                tracing::debug!(status = %error.status_code(), "Refused GraphQL request: {error}");
                error.into_response(&self.encoder)
            }
        }
    }

    async fn run_request(&self, request: http::Request<Bytes>) -> Result<QueryResults, HttpQueryError> {
        let (parts, body) = request.into_parts();
        let query_data = QueryParams::from_query_string(parts.uri.query().unwrap_or_default())?;

        let data = if parts.method == Method::POST && !body.is_empty() {
            load_json_body(&body)?
        } else {
            Value::Object(Default::default())
        };

        self.run_http_query(&parts.method, data, query_data).await
    }
}

impl HttpQueryError {
    /// Answers with the status and headers of the error and its message as the only GraphQL
    /// error of the body.
    pub fn into_response(self, encoder: &JsonEncoder) -> http::Response<Bytes> {
        let body = serde_json::json!({"errors": [{"message": self.message()}]});
        let body = encoder
            .encode(&body)
            .unwrap_or_else(|_| Bytes::from_static(br#"{"errors":[{"message":"Internal server error"}]}"#));

        let mut response = json_response(self.status_code(), body);
        response.headers_mut().extend(self.headers());
        response
    }
}

fn json_response(status_code: StatusCode, body: Bytes) -> http::Response<Bytes> {
    let mut response = http::Response::new(body);
    *response.status_mut() = status_code;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
