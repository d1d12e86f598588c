//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → RouteTable::classify (ordered checks, first match wins)
//!     → matcher.rs (path pattern helpers)
//!     → Return: RelayRoute
//! ```
//!
//! # Order
//! 1. GET  `…/profile/{uuid}`
//! 2. POST `…/join`
//! 3. GET  `…/hasJoined`
//! 4. GET  `{path_prefix}/…` (base upstream style only)
//! 5. GET  anything else → metadata
//! 6. everything else → not found

pub mod matcher;

use axum::http::Method;

use crate::config::UpstreamStyle;

/// What an inbound request asks the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRoute {
    Profile { uuid: String },
    Join,
    /// `subpath` is appended to each upstream base URL.
    HasJoined { subpath: String },
    SessionServer { subpath: String },
    Meta,
    Unmatched,
}

impl RelayRoute {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RelayRoute::Profile { .. } => "profile",
            RelayRoute::Join => "join",
            RelayRoute::HasJoined { .. } => "has_joined",
            RelayRoute::SessionServer { .. } => "sessionserver",
            RelayRoute::Meta => "meta",
            RelayRoute::Unmatched => "unmatched",
        }
    }
}

/// Immutable classification rules, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    style: UpstreamStyle,
    path_prefix: String,
}

impl RouteTable {
    pub fn new(style: UpstreamStyle, path_prefix: impl Into<String>) -> Self {
        Self {
            style,
            path_prefix: path_prefix.into(),
        }
    }

    pub fn classify(&self, method: &Method, path: &str) -> RelayRoute {
        let path = matcher::normalize(path);

        if *method == Method::GET {
            if let Some(uuid) = matcher::trailing_param(path, "profile") {
                return RelayRoute::Profile { uuid: uuid.to_string() };
            }
        }

        if *method == Method::POST && matcher::ends_with_segment(path, "join") {
            return RelayRoute::Join;
        }

        // HEAD is answered like a GET of the metadata document
        let is_get = *method == Method::GET;
        if !is_get && *method != Method::HEAD {
            return RelayRoute::Unmatched;
        }

        if is_get && matcher::ends_with_segment(path, "hasJoined") {
            let subpath = match self.style {
                UpstreamStyle::Endpoint => String::new(),
                UpstreamStyle::Base => matcher::under_prefix(path, &self.path_prefix)
                    .unwrap_or(path)
                    .to_string(),
            };
            return RelayRoute::HasJoined { subpath };
        }

        if is_get && self.style == UpstreamStyle::Base {
            if let Some(subpath) = matcher::under_prefix(path, &self.path_prefix) {
                return RelayRoute::SessionServer { subpath: subpath.to_string() };
            }
        }

        RelayRoute::Meta
    }
}
