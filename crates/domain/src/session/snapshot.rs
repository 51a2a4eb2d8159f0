//! Session snapshot exposed to consumers.

use serde::{Deserialize, Serialize};

use crate::auth::{Impersonator, User};

/// Lifecycle of a session.
///
/// - `Initial`: nothing started yet
/// - `Loading`: the client is being constructed
/// - `Authenticated`: the client reported a signed-in user
/// - `AuthenticatedRefreshed`: a token refresh delivered fresh claims
/// - `Unauthenticated`: no user is signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Nothing started yet.
    #[default]
    Initial,
    /// Client construction in progress.
    Loading,
    /// A user is signed in.
    Authenticated,
    /// A user is signed in and a refresh delivered fresh claims.
    AuthenticatedRefreshed,
    /// No user is signed in.
    Unauthenticated,
}

impl SessionStatus {
    /// True until the client has reported whether a user is signed in.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Initial | Self::Loading)
    }

    /// True when a user is signed in.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::AuthenticatedRefreshed)
    }
}

/// Immutable authentication state.
///
/// Snapshots are never mutated once published; each transition produces a new
/// value (see [`super::reduce`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    /// Where the session is in its lifecycle.
    pub status: SessionStatus,
    /// The signed-in user. Present iff `status.is_authenticated()`.
    pub user: Option<User>,
    /// Primary role in the active organization.
    pub role: Option<String>,
    /// All roles in the active organization.
    pub roles: Vec<String>,
    /// The active organization.
    pub organization_id: Option<String>,
    /// Granted permissions.
    pub permissions: Vec<String>,
    /// Enabled feature flags.
    pub feature_flags: Vec<String>,
    /// Impersonating administrator, if any.
    pub impersonator: Option<Impersonator>,
    /// Latest access token; only set once a refresh has completed.
    pub access_token: Option<String>,
}

impl SessionSnapshot {
    /// The snapshot before anything has started.
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }

    /// An empty snapshot with the given status.
    #[must_use]
    pub fn with_status(status: SessionStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Shorthand for `self.status.is_loading()`.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Shorthand for `self.status.is_authenticated()`.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    /// Returns true if `permission` was granted.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns true if `flag` is enabled.
    #[must_use]
    pub fn has_feature_flag(&self, flag: &str) -> bool {
        self.feature_flags.iter().any(|f| f == flag)
    }

    /// Value equality used to decide whether a transition publishes.
    ///
    /// Users compare by id and `updated_at`; list fields compare by length and
    /// then element by element; every other field compares by value.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        let same_user = match (&self.user, &other.user) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_revision(b),
            _ => false,
        };

        self.status == other.status
            && same_user
            && self.organization_id == other.organization_id
            && self.role == other.role
            && self.access_token == other.access_token
            && self.impersonator == other.impersonator
            && same_items(&self.roles, &other.roles)
            && same_items(&self.permissions, &other.permissions)
            && same_items(&self.feature_flags, &other.feature_flags)
    }
}

fn same_items(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}
