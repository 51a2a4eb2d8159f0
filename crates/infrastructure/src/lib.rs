//! SessionKit Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading and
//! tracing setup for host applications.

pub mod adapters;
pub mod settings;
pub mod telemetry;

pub use adapters::SystemClock;
pub use settings::{ConfigError, ENV_PREFIX, Settings, SettingsLoader};
pub use telemetry::init_tracing;
