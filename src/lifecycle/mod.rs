//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load upstream list → Load user data (offline) → Build engine
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a missing upstream list is fatal
//! - A broken user data file is not; the relay stays online

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_engine, StartupError};
