//! SessionKit Domain - Core authentication types
//!
//! This crate defines the domain model for SessionKit.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

pub use auth::{
    AccessTokenClaims, Actor, AuthenticationResponse, Impersonator, RedirectOptions,
    RedirectParams, RefreshPolicy, SignOutOptions, SwitchOrganizationOptions, TokenDescriptor,
    User, decode_claims, parse_claims,
};
pub use config::ClientConfig;
pub use error::{AuthError, AuthResult, ClaimsError};
pub use session::{RefreshedSession, SessionEvent, SessionSnapshot, SessionStatus, reduce};
pub use state::{AccessTokenState, TokenAction};
