//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, optional debug log)
//!     → request.rs (buffer body, build RelayRequest)
//!     → routing::RouteTable (classify method + path)
//!     → relay::RelayEngine (offline lookup or upstream sweep)
//!     → response.rs (filter headers, serialize body)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
