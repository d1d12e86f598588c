//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! relay.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → command-line overrides (cli.rs)
//!     → RelayConfig (validated, immutable)
//!
//! auth-server-list:
//!     loaded at startup (relay::upstreams)
//!     → watcher.rs detects change (reload = "watch")
//!     → atomic swap of the upstream list
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the upstream list can change
//! - All fields have defaults to allow running with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::RelayConfig;
pub use schema::{ListenerConfig, ObservabilityConfig, OfflineConfig, ProfileServiceConfig, ReloadPolicy, UpstreamConfig, UpstreamStyle};
