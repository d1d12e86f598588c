//! Response emission.
//!
//! # Responsibilities
//! - Turn a [`RelayResponse`] into an HTTP response for the caller
//! - Strip hop-by-hop and framing headers copied from upstreams
//! - Map relay errors to status codes (never with a body)

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::relay::headers::client_response_headers;
use crate::relay::{RelayBody, RelayError, RelayResponse};

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut headers = client_response_headers(&self.headers);

        let body = match self.body {
            RelayBody::Empty => Body::empty(),
            RelayBody::Text(text) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
                }
                Body::from(text)
            }
            RelayBody::Json(value) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Body::from(value.to_string())
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
