//! Command line interface.
//!
//! Flags override values from the optional TOML config file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, RelayConfig, ReloadPolicy, UpstreamStyle};

/// Default user data file for a bare `--offline`.
pub const DEFAULT_USER_DATA: &str = "user-data.json";

#[derive(Debug, Parser)]
#[command(name = "auth-relay")]
#[command(version, about = "Relay for game session authentication servers with ordered fallback", long_about = None)]
pub struct Cli {
    /// Port to listen on [default: 26000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log every inbound request URL
    #[arg(long)]
    pub debug: bool,

    /// Serve users from a local JSON file instead of contacting upstreams
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_USER_DATA)]
    pub offline: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Upstream list file [default: auth-server-list]
    #[arg(long, value_name = "PATH")]
    pub upstreams: Option<PathBuf>,

    /// When to re-read the upstream list
    #[arg(long, value_enum)]
    pub reload: Option<ReloadPolicy>,

    /// How upstream list entries are combined with the request path
    #[arg(long, value_enum)]
    pub style: Option<UpstreamStyle>,

    /// Profile service base URL used for online profile and join
    #[arg(long, value_name = "URL")]
    pub profile_service: Option<String>,

    /// Expose Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Resolve the effective configuration: file (or defaults), then flags.
    pub fn resolve_config(&self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut RelayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.debug {
            config.observability.debug = true;
        }
        if let Some(path) = &self.offline {
            config.offline.enabled = true;
            config.offline.user_data_path = path.clone();
        }
        if let Some(path) = &self.upstreams {
            config.upstreams.list_path = path.clone();
        }
        if let Some(reload) = self.reload {
            config.upstreams.reload = reload;
        }
        if let Some(style) = self.style {
            config.upstreams.style = style;
        }
        if let Some(url) = &self.profile_service {
            config.profile_service.url = url.clone();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.clone();
        }
    }
}
