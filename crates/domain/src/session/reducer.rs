//! Session state machine.

use std::sync::Arc;

use super::snapshot::{SessionSnapshot, SessionStatus};
use crate::auth::{AccessTokenClaims, AuthenticationResponse, Impersonator, User, parse_claims};

/// Everything a token refresh contributes to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedSession {
    /// The signed-in user.
    pub user: User,
    /// The active organization.
    pub organization_id: Option<String>,
    /// Primary role decoded from the token.
    pub role: Option<String>,
    /// Roles decoded from the token.
    pub roles: Vec<String>,
    /// Permissions decoded from the token.
    pub permissions: Vec<String>,
    /// Feature flags decoded from the token.
    pub feature_flags: Vec<String>,
    /// Impersonating administrator.
    pub impersonator: Option<Impersonator>,
    /// The new access token.
    pub access_token: String,
}

impl RefreshedSession {
    /// Decodes the token of `response` and merges it with the response fields.
    ///
    /// An undecodable token contributes no claims. The organization and the
    /// impersonator reported by the response take precedence over the token.
    #[must_use]
    pub fn from_response(response: &AuthenticationResponse) -> Self {
        let claims = parse_claims(&response.access_token).unwrap_or_default();
        let impersonator = response
            .impersonator
            .clone()
            .or_else(|| claims.impersonator());
        let AccessTokenClaims {
            role,
            roles,
            permissions,
            feature_flags,
            org_id,
            ..
        } = claims;

        Self {
            user: response.user.clone(),
            organization_id: response.organization_id.clone().or(org_id),
            role,
            roles,
            permissions,
            feature_flags,
            impersonator,
            access_token: response.access_token.clone(),
        }
    }
}

/// Events that move the session between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Client construction started; the previous session is discarded.
    ClientCreationStarted,
    /// Client construction finished with the user it reported.
    ClientReady {
        /// The signed-in user, if any.
        user: Option<User>,
    },
    /// The client delivered new tokens.
    Refreshed(Box<RefreshedSession>),
    /// The user signed out.
    SignedOut,
    /// Back to the initial state.
    Reset,
}

impl SessionEvent {
    /// Builds a [`SessionEvent::Refreshed`] from a client notification.
    #[must_use]
    pub fn refreshed(response: &AuthenticationResponse) -> Self {
        Self::Refreshed(Box::new(RefreshedSession::from_response(response)))
    }
}

/// Applies `event` to `current`.
///
/// A full candidate snapshot is built for every event. When the candidate is
/// equivalent to `current` the same `Arc` is returned, so consumers can use
/// `Arc::ptr_eq` to skip work.
#[must_use]
pub fn reduce(current: &Arc<SessionSnapshot>, event: &SessionEvent) -> Arc<SessionSnapshot> {
    let candidate = transition(current, event);
    if candidate.is_equivalent(current) {
        Arc::clone(current)
    } else {
        Arc::new(candidate)
    }
}

fn transition(current: &SessionSnapshot, event: &SessionEvent) -> SessionSnapshot {
    match event {
        SessionEvent::ClientCreationStarted => SessionSnapshot::with_status(SessionStatus::Loading),
        // A refresh can land while the client is still being built; keep its claims.
        SessionEvent::ClientReady { user: Some(user) }
            if current.status == SessionStatus::AuthenticatedRefreshed
                && current.user.as_ref().is_some_and(|u| u.id == user.id) =>
        {
            SessionSnapshot {
                user: Some(user.clone()),
                ..current.clone()
            }
        }
        SessionEvent::ClientReady { user: Some(user) } => SessionSnapshot {
            status: SessionStatus::Authenticated,
            user: Some(user.clone()),
            ..SessionSnapshot::default()
        },
        SessionEvent::ClientReady { user: None } | SessionEvent::SignedOut => {
            SessionSnapshot::with_status(SessionStatus::Unauthenticated)
        }
        SessionEvent::Refreshed(refreshed) => {
            let refreshed = refreshed.as_ref().clone();
            SessionSnapshot {
                status: SessionStatus::AuthenticatedRefreshed,
                user: Some(refreshed.user),
                role: refreshed.role,
                roles: refreshed.roles,
                organization_id: refreshed.organization_id,
                permissions: refreshed.permissions,
                feature_flags: refreshed.feature_flags,
                impersonator: refreshed.impersonator,
                access_token: Some(refreshed.access_token),
            }
        }
        SessionEvent::Reset => SessionSnapshot::initial(),
    }
}
