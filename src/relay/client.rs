//! Outbound HTTP capability used by the relay engine.
//!
//! The engine only sees [`UpstreamClient`]; the concrete client lives behind
//! it so the fallback logic can be exercised without a network.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

use crate::relay::headers::upstream_request_headers;

/// Errors from a single outbound call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid upstream URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A request about to leave the relay.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    /// Inbound headers; filtered by the client before sending.
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Perform one outbound call. No retries, no timeout.
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, ClientError>;
}

/// [`UpstreamClient`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("auth-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// Wrap an already configured client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl UpstreamClient for ReqwestClient {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, ClientError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|_| ClientError::InvalidUrl(request.url.clone()))?;

        let mut builder = self
            .inner
            .request(request.method, url)
            .headers(upstream_request_headers(&request.headers));
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse { status, headers, body })
    }
}
