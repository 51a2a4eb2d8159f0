//! Access token fetch state for consumer binding.
//!
//! This module defines the small state machine behind the access-token view:
//! - `FetchStarted`: a fetch is in flight, previous token kept
//! - `FetchSucceeded`: a new token replaces the old one
//! - `FetchFailed`: the error is recorded, previous token kept
//! - `Reset`: the session ended, everything is cleared

use crate::error::AuthError;

/// The current access token together with its fetch status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessTokenState {
    /// The most recently fetched token.
    pub token: Option<String>,
    /// True while a fetch is in flight.
    pub loading: bool,
    /// The error of the last failed fetch, cleared when a new fetch starts.
    pub error: Option<AuthError>,
}

/// Transitions of [`AccessTokenState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    /// A fetch started.
    FetchStarted,
    /// A fetch returned a token.
    FetchSucceeded(String),
    /// A fetch failed.
    FetchFailed(AuthError),
    /// The owning session ended.
    Reset,
}

impl AccessTokenState {
    /// Returns the state after `action`.
    #[must_use]
    pub fn reduce(&self, action: TokenAction) -> Self {
        match action {
            TokenAction::FetchStarted => Self {
                loading: true,
                error: None,
                ..self.clone()
            },
            TokenAction::FetchSucceeded(token) => Self {
                token: Some(token),
                loading: false,
                ..self.clone()
            },
            TokenAction::FetchFailed(error) => Self {
                loading: false,
                error: Some(error),
                ..self.clone()
            },
            TokenAction::Reset => Self::default(),
        }
    }

    /// Applies `action` in place and reports whether anything changed.
    pub fn apply(&mut self, action: TokenAction) -> bool {
        let next = self.reduce(action);
        if next == *self {
            false
        } else {
            *self = next;
            true
        }
    }

    /// Returns true if the last fetch failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_start_keeps_token_and_clears_error() {
        let state = AccessTokenState {
            token: Some("old".to_string()),
            loading: false,
            error: Some(AuthError::LoginRequired),
        };

        let next = state.reduce(TokenAction::FetchStarted);
        assert!(next.loading);
        assert!(next.error.is_none());
        assert_eq!(next.token.as_deref(), Some("old"));
    }

    #[test]
    fn test_fetch_success_replaces_token() {
        let state = AccessTokenState::default()
            .reduce(TokenAction::FetchStarted)
            .reduce(TokenAction::FetchSucceeded("new".to_string()));
        assert!(!state.loading);
        assert_eq!(state.token.as_deref(), Some("new"));
    }

    #[test]
    fn test_fetch_failure_keeps_token() {
        let state = AccessTokenState {
            token: Some("old".to_string()),
            loading: true,
            error: None,
        };

        let next = state.reduce(TokenAction::FetchFailed(AuthError::token_fetch("boom")));
        assert!(!next.loading);
        assert!(next.is_error());
        assert_eq!(next.token.as_deref(), Some("old"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = AccessTokenState {
            token: Some("old".to_string()),
            loading: true,
            error: Some(AuthError::LoginRequired),
        };
        assert_eq!(state.reduce(TokenAction::Reset), AccessTokenState::default());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut state = AccessTokenState::default();
        assert!(!state.apply(TokenAction::Reset));
        assert!(state.apply(TokenAction::FetchStarted));
        assert!(!state.apply(TokenAction::FetchStarted));
    }
}
