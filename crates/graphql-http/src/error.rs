use std::borrow::Cow;

use http::{HeaderMap, HeaderValue, StatusCode};

use crate::JsonMap;

/// An error that prevents a request from reaching the engine at all.
///
/// These are answered with an HTTP error status instead of a GraphQL response. In a batch with
/// error containment enabled, execution errors of this kind are turned into `null` entries.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HttpQueryError {
    #[error("{0}")]
    InvalidInput(Cow<'static, str>),
    #[error("{message}")]
    MethodNotAllowed {
        message: Cow<'static, str>,
        /// Value of the `Allow` header sent back with the error.
        allow: &'static str,
    },
}

impl HttpQueryError {
    pub fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn method_not_allowed(message: impl Into<Cow<'static, str>>, allow: &'static str) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
            allow,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Self::MethodNotAllowed { allow, .. } = self {
            headers.insert(http::header::ALLOW, HeaderValue::from_static(*allow));
        }
        headers
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) | Self::MethodNotAllowed { message, .. } => message,
        }
    }
}

/// A GraphQL error as reported by parsing, validation or execution. It always travels in-band,
/// inside the `errors` of a response.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub extensions: JsonMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphqlError {
            message: message.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl IntoIterator<Item = PathSegment>) -> Self {
        self.path = path.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

impl From<async_graphql_parser::Pos> for Location {
    fn from(pos: async_graphql_parser::Pos) -> Self {
        Location {
            line: pos.line,
            column: pos.column,
        }
    }
}

impl From<async_graphql_parser::Error> for GraphqlError {
    fn from(err: async_graphql_parser::Error) -> Self {
        GraphqlError::new(err.to_string()).with_locations(err.positions().map(Location::from))
    }
}
