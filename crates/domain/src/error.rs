//! Domain error types

use thiserror::Error;

/// Errors raised while decoding the claims carried by an access token.
///
/// Callers that only need "usable claims or nothing" should use the lenient
/// [`crate::auth::parse_claims`] instead of matching on these variants.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The token does not have the `header.payload.signature` shape.
    #[error("malformed token: expected 3 segments, found {segments}")]
    Malformed {
        /// Number of `.`-separated segments found.
        segments: usize,
    },

    /// The payload segment is not valid base64url.
    #[error("invalid token encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON object matching the requested claims type.
    #[error("invalid token payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Authentication errors surfaced by the external client or the scheduler.
///
/// This type is `Clone` so it can live inside published state snapshots.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No session exists; the user has to sign in first.
    #[error("login required")]
    LoginRequired,

    /// Retrieving an access token failed.
    #[error("failed to fetch access token: {message}")]
    TokenFetch {
        /// Error description.
        message: String,
    },

    /// The authentication client could not be constructed.
    #[error("failed to create authentication client: {message}")]
    ClientCreation {
        /// Error description.
        message: String,
    },

    /// A redirecting operation (sign-in, sign-up, sign-out) failed.
    #[error("redirect failed: {message}")]
    Redirect {
        /// Error description.
        message: String,
    },

    /// Switching the active organization failed.
    #[error("failed to switch organization: {message}")]
    OrganizationSwitch {
        /// Error description.
        message: String,
    },

    /// Network error while talking to the identity provider.
    #[error("network error: {message}")]
    Network {
        /// Error description.
        message: String,
    },
}

impl AuthError {
    /// Creates a token fetch error.
    #[must_use]
    pub fn token_fetch(message: impl Into<String>) -> Self {
        Self::TokenFetch {
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Returns true if the error means the user is simply not signed in.
    #[must_use]
    pub const fn is_login_required(&self) -> bool {
        matches!(self, Self::LoginRequired)
    }
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
