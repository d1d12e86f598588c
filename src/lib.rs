//! Authentication Relay Library
//!
//! Relays game session authentication requests to an ordered list of
//! upstream servers, answering with the first one that accepts, or serves
//! them from a local user file in offline mode.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routing;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::RelayEngine;
