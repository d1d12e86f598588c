//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and addresses that are only used later at runtime
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.profile_service.url) {
        Ok(url) if url.host_str().is_none() => errors.push(ValidationError {
            field: "profile_service.url",
            message: format!("'{}' has no host", config.profile_service.url),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError {
            field: "profile_service.url",
            message: format!("'{}' is not a valid URL ({})", config.profile_service.url, e),
        }),
    }

    if !config.profile_service.path_prefix.starts_with('/') {
        errors.push(ValidationError {
            field: "profile_service.path_prefix",
            message: "must start with '/'".to_string(),
        });
    }

    if config.upstreams.list_path.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "upstreams.list_path",
            message: "must not be empty".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!("'{}' is not a socket address", config.observability.metrics_address),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = RelayConfig::default();
        config.profile_service.url = "not a url".into();
        config.profile_service.path_prefix = "sessionserver".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "profile_service.url",
                "profile_service.path_prefix",
                "observability.metrics_address"
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
