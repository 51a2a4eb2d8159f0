//! Authentication client orchestration.
//!
//! This module provides:
//! - Typed callbacks handed to the client at construction
//! - The placeholder client used before construction finishes
//! - Proactive access token refresh

mod hooks;
mod noop_client;
mod token_manager;

pub use hooks::{ClientHooks, RedirectCallback, RefreshFailureCallback, RefreshNotifier};
pub use noop_client::NoopClient;
pub use token_manager::AccessTokenManager;
