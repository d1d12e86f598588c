//! Request/response values passed through the relay core.

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::relay::decode::DecodeError;

/// Read-only view of an inbound request.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RelayRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First decoded value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Path followed by `?query` when a query is present.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// Body of a relayed response.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    Empty,
    Json(Value),
    Text(String),
}

/// Response produced by the relay core.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: RelayBody,
    /// Host of the upstream that produced this response, if any.
    pub upstream: Option<String>,
}

impl RelayResponse {
    pub fn new(status: StatusCode, body: RelayBody) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
            upstream: None,
        }
    }

    pub fn json(status: StatusCode, value: Value) -> Self {
        Self::new(status, RelayBody::Json(value))
    }

    /// Plain 404 with no body.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, RelayBody::Empty)
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        self
    }
}

/// Failures that escape the relay core.
///
/// Upstream refusals and network errors never show up here; they only move
/// the sweep to the next upstream.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An upstream answered with a body its content type could not describe.
    #[error("Undecodable response from {upstream}: {source}")]
    Decode {
        upstream: String,
        #[source]
        source: DecodeError,
    },
}
