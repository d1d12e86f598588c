//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the auth relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Upstream authentication servers.
    pub upstreams: UpstreamConfig,

    /// External profile service used for online profile/join.
    pub profile_service: ProfileServiceConfig,

    /// Offline mode (local user data instead of upstreams).
    pub offline: OfflineConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 26000,
        }
    }
}

/// When the upstream list file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadPolicy {
    /// Read once at startup.
    #[default]
    Static,
    /// Re-read at the start of every sweep.
    PerRequest,
    /// Re-read whenever the file changes on disk.
    Watch,
}

/// How entries of the upstream list are combined with the inbound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamStyle {
    /// Each entry is a complete hasJoined endpoint; only the query is appended.
    #[default]
    Endpoint,
    /// Each entry is a session server base URL; the inbound subpath is appended.
    Base,
}

/// Upstream list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Path to the newline-delimited list of upstream URLs.
    pub list_path: PathBuf,

    /// Reload behaviour for the list file.
    pub reload: ReloadPolicy,

    /// URL composition style.
    pub style: UpstreamStyle,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            list_path: PathBuf::from("auth-server-list"),
            reload: ReloadPolicy::Static,
            style: UpstreamStyle::Endpoint,
        }
    }
}

/// Profile service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileServiceConfig {
    /// Base URL substituted for `path_prefix` (e.g., "https://sessionserver.mojang.com").
    pub url: String,

    /// Inbound path prefix that stands for the profile service.
    pub path_prefix: String,
}

impl Default for ProfileServiceConfig {
    fn default() -> Self {
        Self {
            url: "https://sessionserver.mojang.com".to_string(),
            path_prefix: "/sessionserver".to_string(),
        }
    }
}

/// Offline mode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Serve profile/join/hasJoined from the user data file.
    pub enabled: bool,

    /// JSON array of user records.
    pub user_data_path: PathBuf,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            user_data_path: PathBuf::from("user-data.json"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log every inbound request URL and raise the default log level.
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.port, 26000);
        assert_eq!(config.upstreams.list_path, PathBuf::from("auth-server-list"));
        assert_eq!(config.upstreams.reload, ReloadPolicy::Static);
        assert!(!config.offline.enabled);
    }

    #[test]
    fn test_partial_config() {
        let config: RelayConfig = toml::from_str(
            r#"
            [listener]
            port = 50000

            [upstreams]
            reload = "per-request"
            style = "base"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 50000);
        assert_eq!(config.listener.bind_host, "0.0.0.0");
        assert_eq!(config.upstreams.reload, ReloadPolicy::PerRequest);
        assert_eq!(config.upstreams.style, UpstreamStyle::Base);
        assert_eq!(config.listener.bind_address(), "0.0.0.0:50000");
    }
}
