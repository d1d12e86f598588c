//! Configuration loading from disk.
//!
//! Relative file paths inside a config file are resolved against the
//! directory holding that file, so a relay can be started from anywhere.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Cannot read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "Invalid TOML in {}: {}", path.display(), e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    let mut config: RelayConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    if let Some(base) = path.parent() {
        resolve_paths(&mut config, base);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn resolve_paths(config: &mut RelayConfig, base: &Path) {
    for path in [&mut config.upstreams.list_path, &mut config.offline.user_data_path] {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}
