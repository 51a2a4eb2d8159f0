//! Application error types

use thiserror::Error;

/// Misuse of the scoped session accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// An accessor ran outside [`SessionManager::scope`](crate::SessionManager::scope).
    #[error(
        "no session manager in scope: wrap the calling task in `SessionManager::scope` before using the session accessors"
    )]
    OutsideScope,
}
