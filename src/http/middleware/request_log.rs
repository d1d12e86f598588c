//! Debug request logging.
//! Logs the URL of every inbound request when `--debug` is on.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::request_id;

pub async fn request_log_middleware(req: Request<Body>, next: Next) -> Response {
    tracing::info!(
        request_id = %request_id(&req),
        method = %req.method(),
        "{}",
        req.uri()
    );
    next.run(req).await
}
