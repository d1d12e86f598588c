//! Relay engine: offline lookups and the upstream fallback sweep.
//!
//! # Responsibilities
//! - Serve profile/join/hasJoined from the user store when one is loaded
//! - Otherwise sweep the upstream list in order, first 200 wins
//! - Relay profile/join verbatim to the external profile service
//! - Answer the metadata endpoint
//!
//! # Design Decisions
//! - The sweep is strictly sequential; an upstream is only tried after the
//!   previous one gave a definitive non-200 answer or failed
//! - Refusals and network failures look the same to the caller
//! - No state is mutated after construction

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::config::{ProfileServiceConfig, UpstreamStyle};
use crate::observability::metrics::{self, AttemptOutcome};
use crate::relay::client::{OutboundRequest, UpstreamClient};
use crate::relay::decode::decode_body;
use crate::relay::types::{RelayBody, RelayError, RelayRequest, RelayResponse};
use crate::relay::upstreams::UpstreamSource;
use crate::relay::users::UserStore;

/// Header sent by the offline join stub.
pub const MINECRAFT_REQUEST_ID: &str = "x-minecraft-request-id";

const UNKNOWN_USER: &str = "<unknown>";

pub struct RelayEngine {
    upstreams: UpstreamSource,
    users: Option<Arc<UserStore>>,
    client: Arc<dyn UpstreamClient>,
    profile_service: ProfileServiceConfig,
    style: UpstreamStyle,
}

impl RelayEngine {
    pub fn new(upstreams: UpstreamSource, client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            upstreams,
            users: None,
            client,
            profile_service: ProfileServiceConfig::default(),
            style: UpstreamStyle::default(),
        }
    }

    /// Switch to offline mode. `None` keeps the engine online.
    pub fn with_users(mut self, users: Option<UserStore>) -> Self {
        self.users = users.map(Arc::new);
        self
    }

    pub fn with_profile_service(mut self, profile_service: ProfileServiceConfig) -> Self {
        self.profile_service = profile_service;
        self
    }

    pub fn with_style(mut self, style: UpstreamStyle) -> Self {
        self.style = style;
        self
    }

    pub fn users(&self) -> Option<&UserStore> {
        self.users.as_deref()
    }

    pub fn upstreams(&self) -> &UpstreamSource {
        &self.upstreams
    }

    pub fn style(&self) -> UpstreamStyle {
        self.style
    }

    pub fn profile_service(&self) -> &ProfileServiceConfig {
        &self.profile_service
    }

    /// Profile lookup by UUID.
    pub async fn profile(&self, request: &RelayRequest, uuid: &str) -> Result<RelayResponse, RelayError> {
        if let Some(users) = &self.users {
            return Ok(match users.find_by_id(uuid) {
                Some(user) => RelayResponse::json(StatusCode::OK, user.to_value()),
                None => RelayResponse::not_found(),
            });
        }

        let outbound = OutboundRequest::get(self.profile_service_url(request));
        self.relay_verbatim(outbound).await
    }

    /// Session join. Offline mode answers with a fixed stub and validates nothing.
    pub async fn join(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError> {
        if self.users.is_some() {
            return Ok(RelayResponse::new(StatusCode::OK, RelayBody::Empty)
                .with_header(MINECRAFT_REQUEST_ID, "0"));
        }

        let outbound = OutboundRequest {
            method: Method::POST,
            url: self.profile_service_url(request),
            headers: request.headers.clone(),
            body: request.body.as_ref().map(|body| body.to_string().into_bytes()),
        };
        self.relay_verbatim(outbound).await
    }

    /// hasJoined: offline lookup by name, or the upstream fallback sweep.
    ///
    /// With a user store loaded, upstreams are never consulted.
    pub async fn authenticate(&self, request: &RelayRequest, subpath: &str) -> Result<RelayResponse, RelayError> {
        let username = request.query_param("username");
        let who = username.as_deref().unwrap_or(UNKNOWN_USER);

        if let Some(users) = &self.users {
            if let Some(user) = username.as_deref().and_then(|name| users.find_by_name(name)) {
                tracing::info!(username = %who, "{} authenticated with user data file", who);
                return Ok(RelayResponse::json(StatusCode::OK, user.to_value()));
            }
        } else if let Some(response) = self.sweep(request, subpath).await? {
            tracing::info!(
                username = %who,
                upstream = response.upstream.as_deref().unwrap_or_default(),
                "{} authenticated with {}",
                who,
                response.upstream.as_deref().unwrap_or_default()
            );
            return Ok(response);
        }

        tracing::info!(username = %who, "Failed to authenticate {}", who);
        Ok(RelayResponse::not_found())
    }

    /// Generic session server GET, swept across upstreams.
    pub async fn passthrough(&self, request: &RelayRequest, subpath: &str) -> Result<RelayResponse, RelayError> {
        match self.sweep(request, subpath).await? {
            Some(response) => {
                tracing::debug!(
                    path = %subpath,
                    upstream = response.upstream.as_deref().unwrap_or_default(),
                    "Session server request relayed"
                );
                Ok(response)
            }
            None => {
                tracing::info!(path = %subpath, "No upstream answered session server request");
                Ok(RelayResponse::not_found())
            }
        }
    }

    /// Metadata document. Logs a connection when the caller looks like a game server.
    pub fn meta(&self, path: &str, peer: Option<IpAddr>) -> RelayResponse {
        if is_game_server_path(path) {
            let addr = peer
                .map(|ip| ip.to_canonical().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info!(peer = %addr, "Game server ({}) connected", addr);
        }

        RelayResponse::json(StatusCode::OK, json!({ "meta": {} }))
    }

    /// Try each upstream in order. `Ok(None)` means every upstream failed.
    async fn sweep(&self, request: &RelayRequest, subpath: &str) -> Result<Option<RelayResponse>, RelayError> {
        let upstreams = self.upstreams.current().await;

        for upstream in upstreams.iter() {
            let outbound = OutboundRequest {
                method: request.method.clone(),
                url: upstream.forward_url(subpath, request.query.as_deref()),
                headers: request.headers.clone(),
                body: None,
            };

            match self.client.send(outbound).await {
                Ok(response) if response.status == StatusCode::OK => {
                    metrics::record_upstream_attempt(upstream.host(), AttemptOutcome::Accepted);
                    let body = decode_body(&response.headers, &response.body).map_err(|source| {
                        RelayError::Decode {
                            upstream: upstream.host().to_string(),
                            source,
                        }
                    })?;
                    return Ok(Some(RelayResponse {
                        status: StatusCode::OK,
                        headers: response.headers,
                        body,
                        upstream: Some(upstream.host().to_string()),
                    }));
                }
                Ok(response) => {
                    metrics::record_upstream_attempt(upstream.host(), AttemptOutcome::Rejected);
                    tracing::debug!(upstream = %upstream.host(), status = %response.status, "Upstream refused, trying next");
                }
                Err(e) => {
                    metrics::record_upstream_attempt(upstream.host(), AttemptOutcome::Unreachable);
                    tracing::debug!(upstream = %upstream.host(), error = %e, "Upstream unreachable, trying next");
                }
            }
        }

        Ok(None)
    }

    /// Forward to the profile service and return whatever it answers.
    async fn relay_verbatim(&self, outbound: OutboundRequest) -> Result<RelayResponse, RelayError> {
        let target = outbound.url.clone();
        let host = url::Url::parse(&target)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| target.clone());

        match self.client.send(outbound).await {
            Ok(response) => {
                let body = decode_body(&response.headers, &response.body).map_err(|source| {
                    RelayError::Decode {
                        upstream: host.clone(),
                        source,
                    }
                })?;
                Ok(RelayResponse {
                    status: response.status,
                    headers: response.headers,
                    body,
                    upstream: Some(host),
                })
            }
            Err(e) => {
                tracing::warn!(upstream = %host, error = %e, "Profile service request failed");
                Ok(RelayResponse::not_found())
            }
        }
    }

    /// Inbound path+query with the profile service prefix replaced by its URL.
    fn profile_service_url(&self, request: &RelayRequest) -> String {
        let target = request.path_and_query();
        let rest = target
            .strip_prefix(self.profile_service.path_prefix.as_str())
            .unwrap_or(&target);
        format!("{}{}", self.profile_service.url.trim_end_matches('/'), rest)
    }
}

/// True when one whole path segment is `server`.
fn is_game_server_path(path: &str) -> bool {
    path.split('/').any(|segment| segment == "server")
}
