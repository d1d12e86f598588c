//! Relay core.
//!
//! # Data Flow
//! ```text
//! RelayRequest (method, path, query, headers, JSON body)
//!     → engine.rs
//!         offline: users.rs (UserStore lookup, no network)
//!         online:  upstreams.rs (current UpstreamList)
//!                  → client.rs (one outbound call per upstream, in order)
//!                  → decode.rs (JSON or text, by content type)
//!     → RelayResponse (status, headers, body, serving upstream)
//! ```
//!
//! # Design Decisions
//! - The user store and upstream list are injected at construction
//! - The HTTP client is a trait object so the sweep is testable offline
//! - Only a decode failure escapes as an error; everything else is a response

pub mod client;
pub mod decode;
pub mod engine;
pub mod headers;
pub mod types;
pub mod upstreams;
pub mod users;

pub use client::{ClientError, ReqwestClient, UpstreamClient};
pub use engine::RelayEngine;
pub use types::{RelayBody, RelayError, RelayRequest, RelayResponse};
pub use upstreams::{UpstreamEntry, UpstreamList, UpstreamListError, UpstreamSource};
pub use users::{UserDataError, UserRecord, UserStore};
