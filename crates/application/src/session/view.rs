//! Read views handed to consumers.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use sessionkit_domain::{
    AccessTokenClaims, AccessTokenState, AuthError, AuthResult, SessionSnapshot, parse_claims,
};

use crate::auth::AccessTokenManager;
use crate::ports::AuthClient;

/// The client handle merged with the session snapshot.
///
/// Dereferences to [`SessionSnapshot`], so `view.status` and `view.user` read
/// straight through.
#[derive(Clone)]
pub struct AuthView {
    client: Arc<dyn AuthClient>,
    session: Arc<SessionSnapshot>,
}

impl AuthView {
    pub(crate) fn new(
        client: Arc<dyn AuthClient>,
        session: Arc<SessionSnapshot>,
    ) -> Self {
        Self { client, session }
    }

    /// The client handle captured with this view.
    #[must_use]
    pub const fn client(&self) -> &Arc<dyn AuthClient> {
        &self.client
    }

    /// The snapshot captured with this view.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionSnapshot> {
        &self.session
    }
}

impl Deref for AuthView {
    type Target = SessionSnapshot;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl fmt::Debug for AuthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthView")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// The access token with its fetch status.
#[derive(Clone)]
pub struct AccessTokenView {
    /// The most recently fetched token.
    pub access_token: Option<String>,
    /// True while a fetch is in flight.
    pub loading: bool,
    /// The error of the last failed fetch.
    pub error: Option<AuthError>,
    manager: Option<AccessTokenManager>,
}

impl AccessTokenView {
    pub(crate) fn new(state: AccessTokenState, manager: Option<AccessTokenManager>) -> Self {
        Self {
            access_token: state.token,
            loading: state.loading,
            error: state.error,
            manager,
        }
    }

    /// Fetches a new token now.
    ///
    /// Returns `Ok(None)` when nobody was signed in when the view was taken, a
    /// fetch is already in flight, or the session has since ended.
    ///
    /// # Errors
    /// Returns the client's error when the fetch fails.
    pub async fn refresh(&self) -> AuthResult<Option<String>> {
        match &self.manager {
            Some(manager) => manager.refresh().await,
            None => Ok(None),
        }
    }

    /// Claims of [`access_token`](Self::access_token); empty when there is
    /// no readable token.
    #[must_use]
    pub fn claims(&self) -> AccessTokenClaims {
        self.access_token
            .as_deref()
            .and_then(parse_claims)
            .unwrap_or_default()
    }
}

impl fmt::Debug for AccessTokenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenView")
            .field("has_token", &self.access_token.is_some())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
