//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all relay handler
//! - Wire up middleware (request ID, tracing, debug request log)
//! - Dispatch classified requests to the relay engine
//! - Keep the upstream list watcher alive in `watch` reload mode
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ReloadPolicy;
use crate::config::watcher::UpstreamListWatcher;
use crate::http::middleware::request_log_middleware;
use crate::http::request::{into_relay_request, request_id, MakeRequestUuid};
use crate::observability::metrics;
use crate::relay::{RelayEngine, RelayResponse};
use crate::routing::{RelayRoute, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RelayEngine>,
    pub routes: Arc<RouteTable>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    engine: Arc<RelayEngine>,
}

impl HttpServer {
    /// Create a new HTTP server around a fully built engine.
    pub fn new(engine: RelayEngine, debug: bool) -> Self {
        let routes = Arc::new(RouteTable::new(
            engine.style(),
            engine.profile_service().path_prefix.clone(),
        ));
        let engine = Arc::new(engine);

        let state = AppState {
            engine: engine.clone(),
            routes,
        };

        let router = Self::build_router(state, debug);
        Self { router, engine }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, debug: bool) -> Router {
        let router = Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state);

        let router = if debug {
            router.layer(middleware::from_fn(request_log_middleware))
        } else {
            router
        };

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// The router, for serving on a custom transport or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "Proxy server running on port {}",
            addr.port()
        );

        let _watcher = self.start_upstream_watcher();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Start the file watcher when the upstream list is in `watch` mode.
    ///
    /// The returned watcher stops delivering events once dropped.
    fn start_upstream_watcher(&self) -> Option<notify::RecommendedWatcher> {
        let source = self.engine.upstreams().clone();
        if source.policy() != ReloadPolicy::Watch {
            return None;
        }
        let path = source.path()?.to_path_buf();

        let (watcher, mut updates) = UpstreamListWatcher::new(&path);
        let watcher = match watcher.run() {
            Ok(w) => w,
            Err(e) => {
                tracing::error!(path = ?path, error = %e, "Failed to watch upstream list, serving the startup list");
                return None;
            }
        };

        tokio::spawn(async move {
            while let Some(list) = updates.recv().await {
                tracing::info!(count = list.len(), "Loaded {} auth server(s)", list.len());
                source.replace(list);
            }
        });

        Some(watcher)
    }
}

/// Main relay handler.
/// Classifies the request and hands it to the matching engine operation.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let route = state.routes.classify(request.method(), request.uri().path());
    let label = route.label();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        route = label,
        "Relaying request"
    );

    let relay_request = match into_relay_request(request).await {
        Ok(r) => r,
        Err(status) => {
            tracing::warn!(request_id = %request_id, status = %status, "Rejected inbound body");
            metrics::record_request(label, status.as_u16(), start_time);
            return status.into_response();
        }
    };

    let engine = &state.engine;
    let result = match &route {
        RelayRoute::Profile { uuid } => engine.profile(&relay_request, uuid).await,
        RelayRoute::Join => engine.join(&relay_request).await,
        RelayRoute::HasJoined { subpath } => engine.authenticate(&relay_request, subpath).await,
        RelayRoute::SessionServer { subpath } => engine.passthrough(&relay_request, subpath).await,
        RelayRoute::Meta => Ok(engine.meta(&relay_request.path, peer)),
        RelayRoute::Unmatched => Ok(RelayResponse::not_found()),
    };

    let response = match result {
        Ok(relayed) => relayed.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, route = label, error = %e, "Relay failed");
            e.into_response()
        }
    };

    metrics::record_request(label, response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{UpstreamList, UpstreamSource, UserRecord, UserStore};
    use crate::relay::client::{ClientError, OutboundRequest, UpstreamClient, UpstreamResponse};
    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    /// Client that must never be reached.
    struct NoNetwork;

    #[async_trait]
    impl UpstreamClient for NoNetwork {
        async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, ClientError> {
            panic!("unexpected outbound call to {}", request.url);
        }
    }

    fn offline_server() -> HttpServer {
        let users = UserStore::from_records(vec![UserRecord {
            id: "u-alice".into(),
            name: "Alice".into(),
            profile: serde_json::Map::new(),
        }]);
        let engine = RelayEngine::new(
            UpstreamSource::fixed(UpstreamList::parse("http://a.example").unwrap()),
            Arc::new(NoNetwork),
        )
        .with_users(Some(users));
        HttpServer::new(engine, true)
    }

    async fn call(server: &HttpServer, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        server.router().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_request_id_is_set() {
        let server = offline_server();
        let response = call(&server, Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_offline_routes() {
        let server = offline_server();

        let response = call(&server, Method::GET, "/sessionserver/session/minecraft/hasJoined?username=Alice").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = call(&server, Method::GET, "/sessionserver/session/minecraft/profile/u-bob").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = call(&server, Method::POST, "/sessionserver/session/minecraft/join").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-minecraft-request-id").unwrap(), "0");

        let response = call(&server, Method::PUT, "/anything").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_answers_like_meta() {
        let server = offline_server();

        let response = call(&server, Method::HEAD, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = call(&server, Method::HEAD, "/sessionserver/session/minecraft/hasJoined?username=Alice").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
