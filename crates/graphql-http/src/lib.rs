//! Transport adaptation between GraphQL-over-HTTP payloads and a GraphQL engine.
//!
//! A payload, either a single request object or a batch of them, goes through four steps:
//! parameter extraction ([`request`]), execution of every item against an [`Engine`]
//! ([`execute`]), batch orchestration ([`batch`]) and encoding of all outcomes into one body and
//! one status code ([`response`]). [`GraphqlServer`] wires those together for `http` requests.

mod batch;
mod config;
mod document;
pub mod engine;
mod error;
mod execute;
pub mod request;
mod response;
mod server;

pub use batch::{run_http_query, QueryResults};
pub use config::HttpQueryConfig;
pub use document::{get_operation, parse};
pub use engine::{Engine, ExecutionRequest, ExecutionResult};
pub use error::{GraphqlError, HttpQueryError, Location, PathSegment};
pub use execute::{execute_graphql_request, ExecutionOutcome};
pub use request::{load_json_body, GraphqlParams, QueryParams};
pub use response::{
    default_format_error, encode_execution_results, format_execution_result, EncodedResponse, JsonEncoder,
};
pub use server::{FormatError, GraphqlServer};

/// A JSON object, as used for variables, error extensions and response data.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
