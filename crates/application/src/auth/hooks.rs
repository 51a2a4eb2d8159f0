//! Callbacks handed to the authentication client.
//!
//! These replace ambient event buses: the client receives typed callbacks at
//! construction and invokes them directly.

use std::fmt;
use std::sync::Arc;

use sessionkit_domain::{AuthError, AuthenticationResponse, RedirectParams};

/// Called after a sign-in redirect completes.
pub type RedirectCallback = Arc<dyn Fn(RedirectParams) + Send + Sync>;

/// Called by the token scheduler whenever fetching an access token fails.
pub type RefreshFailureCallback = Arc<dyn Fn(&AuthError) + Send + Sync>;

/// Delivers "token changed" notifications from the client to the session.
#[derive(Clone)]
pub struct RefreshNotifier {
    callback: Arc<dyn Fn(AuthenticationResponse) + Send + Sync>,
}

impl RefreshNotifier {
    /// Wraps `callback`.
    #[must_use]
    pub fn new(callback: impl Fn(AuthenticationResponse) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// A notifier that drops every notification.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Reports new tokens.
    pub fn notify(&self, response: AuthenticationResponse) {
        (self.callback)(response);
    }
}

impl fmt::Debug for RefreshNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshNotifier").finish_non_exhaustive()
    }
}

/// Everything the client factory passes on to a new client.
#[derive(Clone)]
pub struct ClientHooks {
    /// Token change notifications.
    pub on_refresh: RefreshNotifier,
    /// Redirect completion.
    pub on_redirect: Option<RedirectCallback>,
}

impl ClientHooks {
    /// Hooks that only forward refresh notifications.
    #[must_use]
    pub const fn new(on_refresh: RefreshNotifier) -> Self {
        Self {
            on_refresh,
            on_redirect: None,
        }
    }

    /// Invokes the redirect callback, if any.
    pub fn redirected(&self, params: RedirectParams) {
        if let Some(callback) = &self.on_redirect {
            callback(params);
        }
    }
}

impl fmt::Debug for ClientHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHooks")
            .field("on_redirect", &self.on_redirect.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use sessionkit_domain::User;

    fn response() -> AuthenticationResponse {
        AuthenticationResponse {
            user: User::new("user_01", "a@example.com", Utc::now()),
            access_token: "token".to_string(),
            organization_id: None,
            impersonator: None,
        }
    }

    #[test]
    fn test_notifier_forwards_responses() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let notifier = RefreshNotifier::new(move |r| sink.lock().push(r.access_token));

        notifier.notify(response());
        notifier.clone().notify(response());
        assert_eq!(seen.lock().len(), 2);

        RefreshNotifier::noop().notify(response());
    }

    fn params() -> RedirectParams {
        RedirectParams {
            state: None,
            response: response(),
        }
    }

    #[test]
    fn test_hooks_invoke_optional_redirect() {
        let redirects = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&redirects);

        let mut hooks = ClientHooks::new(RefreshNotifier::noop());
        hooks.redirected(params());
        assert!(redirects.lock().is_empty());

        hooks.on_redirect = Some(Arc::new(move |params: RedirectParams| sink.lock().push(params)));
        hooks.redirected(params());
        assert_eq!(redirects.lock().len(), 1);
        assert!(format!("{hooks:?}").contains("on_redirect: true"));
    }
}
