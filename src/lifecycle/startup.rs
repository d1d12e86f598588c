//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the upstream list (fatal when missing or invalid)
//! - Load the user data file in offline mode (non-fatal)
//! - Build the HTTP client and assemble the relay engine

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::relay::{
    ClientError, RelayEngine, ReqwestClient, UpstreamClient, UpstreamListError, UpstreamSource,
    UserStore,
};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Upstreams(#[from] UpstreamListError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] ClientError),
}

/// Build the relay engine described by `config`.
pub fn build_engine(config: &RelayConfig) -> Result<RelayEngine, StartupError> {
    let client: Arc<dyn UpstreamClient> = Arc::new(ReqwestClient::new()?);
    build_engine_with_client(config, client)
}

/// Like [`build_engine`], with a caller-provided HTTP client.
pub fn build_engine_with_client(
    config: &RelayConfig,
    client: Arc<dyn UpstreamClient>,
) -> Result<RelayEngine, StartupError> {
    let upstreams = UpstreamSource::from_file(&config.upstreams.list_path, config.upstreams.reload)?;
    let count = upstreams.snapshot().len();
    tracing::info!(
        path = ?config.upstreams.list_path,
        reload = ?config.upstreams.reload,
        "Loaded {} auth server(s)",
        count
    );

    let users = if config.offline.enabled {
        load_user_data(&config.offline.user_data_path)
    } else {
        None
    };

    Ok(RelayEngine::new(upstreams, client)
        .with_users(users)
        .with_profile_service(config.profile_service.clone())
        .with_style(config.upstreams.style))
}

/// Load offline user data. Failures are logged and yield `None`, which
/// leaves the relay in online mode.
pub fn load_user_data(path: &Path) -> Option<UserStore> {
    match UserStore::load(path) {
        Ok(store) => {
            tracing::info!(path = ?path, count = store.len(), "Loaded {} user(s)", store.len());
            Some(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Offline mode disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_upstream_list_is_fatal() {
        let mut config = RelayConfig::default();
        config.upstreams.list_path = "/nonexistent/auth-server-list".into();

        assert!(matches!(
            build_engine(&config),
            Err(StartupError::Upstreams(UpstreamListError::Io { .. }))
        ));
    }

    #[test]
    fn test_offline_mode_loads_users() {
        let list = write_temp("http://a.example\n");
        let users = write_temp(r#"[{"id": "u1", "name": "Alice"}]"#);

        let mut config = RelayConfig::default();
        config.upstreams.list_path = list.path().to_path_buf();
        config.offline.enabled = true;
        config.offline.user_data_path = users.path().to_path_buf();

        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.users().unwrap().len(), 1);
        assert_eq!(engine.upstreams().snapshot().len(), 1);
    }

    #[test]
    fn test_bad_user_data_falls_back_to_online() {
        let list = write_temp("");
        let users = write_temp("not json");

        let mut config = RelayConfig::default();
        config.upstreams.list_path = list.path().to_path_buf();
        config.offline.enabled = true;
        config.offline.user_data_path = users.path().to_path_buf();

        let engine = build_engine(&config).unwrap();
        assert!(engine.users().is_none());
    }
}
