//! Task-scoped access to the enclosing session manager.
//!
//! A manager installed with [`SessionManager::scope`] is visible to every
//! accessor called from inside the scoped future, without passing it down
//! explicitly.

use std::future::Future;

use sessionkit_domain::AccessTokenClaims;

use super::manager::SessionManager;
use super::view::{AccessTokenView, AuthView};
use crate::error::ContextError;

tokio::task_local! {
    static CURRENT_SESSION: SessionManager;
}

impl SessionManager {
    /// Runs `future` with this manager as the enclosing session.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT_SESSION.scope(self.clone(), future).await
    }
}

/// The enclosing session manager.
///
/// # Errors
/// Returns [`ContextError::OutsideScope`] when called outside
/// [`SessionManager::scope`].
pub fn try_current() -> Result<SessionManager, ContextError> {
    CURRENT_SESSION
        .try_with(SessionManager::clone)
        .map_err(|_| ContextError::OutsideScope)
}

/// The enclosing session manager.
///
/// # Panics
/// Panics when called outside [`SessionManager::scope`].
#[must_use]
#[track_caller]
#[allow(clippy::panic)]
pub fn current() -> SessionManager {
    match try_current() {
        Ok(manager) => manager,
        Err(error) => panic!("{error}"),
    }
}

/// Client and snapshot of the enclosing session.
///
/// # Errors
/// Returns [`ContextError::OutsideScope`] outside a scope.
pub fn use_auth() -> Result<AuthView, ContextError> {
    try_current().map(|manager| manager.auth())
}

/// Access token view of the enclosing session.
///
/// # Errors
/// Returns [`ContextError::OutsideScope`] outside a scope.
pub fn use_access_token() -> Result<AccessTokenView, ContextError> {
    try_current().map(|manager| manager.access_token())
}

/// Token claims of the enclosing session.
///
/// # Errors
/// Returns [`ContextError::OutsideScope`] outside a scope.
pub fn use_token_claims() -> Result<AccessTokenClaims, ContextError> {
    try_current().map(|manager| manager.token_claims())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_fail_outside_scope() {
        assert_eq!(try_current().err(), Some(ContextError::OutsideScope));
        assert_eq!(use_auth().err(), Some(ContextError::OutsideScope));
        assert_eq!(use_token_claims().err(), Some(ContextError::OutsideScope));
        assert!(
            ContextError::OutsideScope
                .to_string()
                .contains("SessionManager::scope")
        );
    }

    #[test]
    #[should_panic(expected = "no session manager in scope")]
    fn test_current_panics_outside_scope() {
        let _ = current();
    }
}
