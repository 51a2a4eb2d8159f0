//! SessionKit Application - Session orchestration
//!
//! This crate drives the external authentication client: it owns the session
//! manager, the proactive access token refresh and the ports the host
//! application implements.

pub mod auth;
pub mod error;
pub mod ports;
pub mod session;

pub use auth::{
    AccessTokenManager, ClientHooks, NoopClient, RedirectCallback, RefreshFailureCallback,
    RefreshNotifier,
};
pub use error::ContextError;
pub use ports::{AuthClient, ClientFactory, Clock};
pub use session::context::{
    current, try_current, use_access_token, use_auth, use_token_claims,
};
pub use session::{AccessTokenView, AuthView, SessionManager, SessionOptions};
