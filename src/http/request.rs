//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Buffer the inbound body and parse it as JSON when declared as such
//! - Produce the read-only [`RelayRequest`] view for the relay core

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::relay::decode::is_json;
use crate::relay::RelayRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Inbound JSON bodies larger than this are rejected.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID previously set by the middleware, if any.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build a [`RelayRequest`] from an axum request.
///
/// Returns `413 Payload Too Large` for JSON bodies over [`MAX_BODY_BYTES`] and
/// `400 Bad Request` for unreadable or malformed ones.
pub async fn into_relay_request(request: Request<Body>) -> Result<RelayRequest, StatusCode> {
    let (parts, body) = request.into_parts();

    let body = if is_json(&parts.headers) {
        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| {
                if e.into_inner().is::<LengthLimitError>() {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                }
            })?;
        if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).map_err(|_| StatusCode::BAD_REQUEST)?)
        }
    } else {
        None
    };

    Ok(RelayRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    })
}
