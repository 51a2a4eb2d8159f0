//! Session manager options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sessionkit_domain::{AuthError, ClientConfig, RedirectParams, RefreshPolicy};

use crate::auth::{RedirectCallback, RefreshFailureCallback};

/// Everything a [`SessionManager`](super::SessionManager) is configured with.
#[derive(Clone)]
pub struct SessionOptions {
    /// Identity of the authentication client.
    pub client: ClientConfig,
    /// Proactive refresh timing.
    pub refresh_policy: RefreshPolicy,
    /// Invoked after a sign-in redirect completes.
    pub on_redirect: Option<RedirectCallback>,
    /// Invoked whenever fetching an access token fails.
    pub on_refresh_failure: Option<RefreshFailureCallback>,
}

impl SessionOptions {
    /// Options with the default refresh policy and no callbacks.
    #[must_use]
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            refresh_policy: RefreshPolicy::default(),
            on_redirect: None,
            on_refresh_failure: None,
        }
    }

    /// Sets the refresh policy.
    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Refresh tokens this long before they expire.
    #[must_use]
    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_policy = self.refresh_policy.with_expiry_buffer(buffer);
        self
    }

    /// Sets the redirect callback.
    #[must_use]
    pub fn on_redirect(mut self, callback: impl Fn(RedirectParams) + Send + Sync + 'static) -> Self {
        self.on_redirect = Some(Arc::new(callback));
        self
    }

    /// Sets the refresh-failure callback.
    #[must_use]
    pub fn on_refresh_failure(
        mut self,
        callback: impl Fn(&AuthError) + Send + Sync + 'static,
    ) -> Self {
        self.on_refresh_failure = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("client", &self.client)
            .field("refresh_policy", &self.refresh_policy)
            .field("on_redirect", &self.on_redirect.is_some())
            .field("on_refresh_failure", &self.on_refresh_failure.is_some())
            .finish()
    }
}
