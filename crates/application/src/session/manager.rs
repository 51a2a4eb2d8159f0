//! The session manager.
//!
//! Holds the current client handle and the published session snapshot,
//! rebuilds the client whenever the identity configuration changes and keeps
//! an [`AccessTokenManager`] running for whichever user is signed in.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use sessionkit_domain::{
    AccessTokenClaims, AccessTokenState, AuthResult, AuthenticationResponse, ClientConfig,
    RedirectOptions, SessionEvent, SessionSnapshot, SignOutOptions, SwitchOrganizationOptions,
    TokenAction, User, decode_claims, parse_claims, reduce,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::options::SessionOptions;
use super::view::{AccessTokenView, AuthView};
use crate::auth::{AccessTokenManager, ClientHooks, NoopClient, RefreshNotifier};
use crate::ports::{AuthClient, ClientFactory, Clock};

/// The refresh scheduler bound to one signed-in user.
struct TrackedSession {
    user_id: String,
    tokens: AccessTokenManager,
}

struct ManagerInner {
    factory: Arc<dyn ClientFactory>,
    clock: Arc<dyn Clock>,
    options: SessionOptions,
    config: Mutex<ClientConfig>,
    runtime: Mutex<Option<Handle>>,
    /// Serializes generation bumps with everything published under a
    /// generation check.
    transition: Mutex<()>,
    started: AtomicBool,
    generation: AtomicU64,
    ready: AtomicBool,
    client: RwLock<Arc<dyn AuthClient>>,
    snapshot: watch::Sender<Arc<SessionSnapshot>>,
    token_state: Arc<watch::Sender<AccessTokenState>>,
    construction: Mutex<Option<JoinHandle<()>>>,
    tracked: Mutex<Option<TrackedSession>>,
}

/// Orchestrates the authentication client for a host application.
///
/// Cloning is cheap; all clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    /// Creates a manager in the initial state. Nothing happens until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(
        options: SessionOptions,
        factory: Arc<dyn ClientFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(SessionSnapshot::initial()));
        let (token_state, _) = watch::channel(AccessTokenState::default());

        Self {
            inner: Arc::new(ManagerInner {
                factory,
                clock,
                config: Mutex::new(options.client.clone()),
                runtime: Mutex::new(None),
                transition: Mutex::new(()),
                options,
                started: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                ready: AtomicBool::new(false),
                client: RwLock::new(Arc::new(NoopClient)),
                snapshot,
                token_state: Arc::new(token_state),
                construction: Mutex::new(None),
                tracked: Mutex::new(None),
            }),
        }
    }

    /// Begins constructing the client for the configured identity.
    ///
    /// Must be called from within a Tokio runtime; the manager keeps using
    /// that runtime afterwards, so the client may deliver notifications from
    /// any thread. Later calls are no-ops.
    pub fn start(&self) {
        let runtime = self.inner.runtime();
        let _transition = self.inner.transition.lock();
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let config = self.inner.config.lock().clone();
        self.inner.begin_construction(&runtime, config);
    }

    /// Switches to a new identity configuration.
    ///
    /// Returns false when `config` has the same identity as the current one;
    /// the stored config is still updated, so a `dev_mode` change applies to
    /// the next construction. Otherwise the session is torn down, the no-op
    /// client and a loading snapshot are published, and the new client is
    /// constructed in the background.
    pub fn reconfigure(&self, config: ClientConfig) -> bool {
        let runtime = self.inner.runtime();
        let _transition = self.inner.transition.lock();
        {
            let mut current = self.inner.config.lock();
            let unchanged = current.same_identity(&config);
            current.clone_from(&config);
            if unchanged {
                return false;
            }
        }
        tracing::info!(client_id = %config.client_id, "client identity changed");
        self.inner.started.store(true, Ordering::Release);
        self.inner.begin_construction(&runtime, config);
        true
    }

    /// The current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.inner.snapshot.borrow())
    }

    /// Subscribes to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.inner.snapshot.subscribe()
    }

    /// The current client handle: the no-op client until construction
    /// succeeds.
    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthClient> {
        self.inner.client()
    }

    /// The current identity configuration.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        self.inner.config.lock().clone()
    }

    /// Client and session snapshot in one view.
    #[must_use]
    pub fn auth(&self) -> AuthView {
        AuthView::new(self.client(), self.snapshot())
    }

    /// The access token state of the signed-in user.
    #[must_use]
    pub fn access_token(&self) -> AccessTokenView {
        let state = self.inner.token_state.borrow().clone();
        AccessTokenView::new(state, self.inner.tokens())
    }

    /// Subscribes to access token state changes. The receiver survives user
    /// and identity changes.
    #[must_use]
    pub fn subscribe_access_token(&self) -> watch::Receiver<AccessTokenState> {
        self.inner.token_state.subscribe()
    }

    /// Fetches a new access token now.
    ///
    /// Returns `Ok(None)` when nobody is signed in or a fetch is already in
    /// flight.
    ///
    /// # Errors
    /// Returns the client's error when the fetch fails.
    pub async fn refresh_access_token(&self) -> AuthResult<Option<String>> {
        match self.inner.tokens() {
            Some(tokens) => tokens.refresh().await,
            None => Ok(None),
        }
    }

    /// Claims of the current access token; empty when there is no readable
    /// token.
    #[must_use]
    pub fn token_claims(&self) -> AccessTokenClaims {
        self.current_token()
            .and_then(|token| parse_claims(&token))
            .unwrap_or_default()
    }

    /// Decodes the current access token into a caller-defined claims type.
    #[must_use]
    pub fn token_claims_as<T: DeserializeOwned>(&self) -> Option<T> {
        let token = self.current_token()?;
        decode_claims(&token).ok()
    }

    /// Starts the sign-in flow.
    ///
    /// # Errors
    /// Returns the client's error.
    pub async fn sign_in(&self, options: RedirectOptions) -> AuthResult<()> {
        self.client().sign_in(options).await
    }

    /// Starts the sign-up flow.
    ///
    /// # Errors
    /// Returns the client's error.
    pub async fn sign_up(&self, options: RedirectOptions) -> AuthResult<()> {
        self.client().sign_up(options).await
    }

    /// Signs out and moves the session to unauthenticated.
    ///
    /// # Errors
    /// Returns the client's error; the session is left untouched in that case.
    pub async fn sign_out(&self, options: SignOutOptions) -> AuthResult<()> {
        self.client().sign_out(options).await?;
        self.inner.dispatch(&SessionEvent::SignedOut);
        Ok(())
    }

    /// Switches the active organization.
    ///
    /// # Errors
    /// Returns the client's error.
    pub async fn switch_to_organization(
        &self,
        options: SwitchOrganizationOptions,
    ) -> AuthResult<()> {
        self.client().switch_to_organization(options).await
    }

    /// Cancels client construction and stops refreshing tokens.
    ///
    /// Refresh notifications from the existing client are ignored afterwards.
    pub fn shutdown(&self) {
        let _transition = self.inner.transition.lock();
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.abort_construction();
        self.inner.stop_tracking();
        tracing::debug!("session manager shut down");
    }

    fn current_token(&self) -> Option<String> {
        self.inner
            .token_state
            .borrow()
            .token
            .clone()
            .or_else(|| self.inner.snapshot.borrow().access_token.clone())
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("client_id", &self.inner.config.lock().client_id)
            .field("status", &self.inner.snapshot.borrow().status)
            .field("generation", &self.inner.generation.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl ManagerInner {
    fn client(&self) -> Arc<dyn AuthClient> {
        Arc::clone(&self.client.read())
    }

    fn tokens(&self) -> Option<AccessTokenManager> {
        self.tracked.lock().as_ref().map(|tracked| tracked.tokens.clone())
    }

    fn runtime(&self) -> Handle {
        self.runtime
            .lock()
            .get_or_insert_with(Handle::current)
            .clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Caller holds `transition`.
    fn begin_construction(self: &Arc<Self>, runtime: &Handle, config: ClientConfig) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.abort_construction();
        self.stop_tracking();

        self.ready.store(false, Ordering::Release);
        *self.client.write() = Arc::new(NoopClient);
        self.dispatch(&SessionEvent::ClientCreationStarted);

        tracing::debug!(generation, client_id = %config.client_id, "constructing authentication client");
        let handle = runtime.spawn(construct(Arc::downgrade(self), generation, config));
        *self.construction.lock() = Some(handle);
    }

    fn abort_construction(&self) {
        if let Some(handle) = self.construction.lock().take() {
            handle.abort();
        }
    }

    fn hooks(self: &Arc<Self>, generation: u64) -> ClientHooks {
        let weak = Arc::downgrade(self);
        let on_refresh = RefreshNotifier::new(move |response| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_refresh(generation, &response);
            }
        });

        ClientHooks {
            on_refresh,
            on_redirect: self.options.on_redirect.clone(),
        }
    }

    fn handle_refresh(&self, generation: u64, response: &AuthenticationResponse) {
        let _transition = self.transition.lock();
        if !self.is_current(generation) {
            tracing::debug!(generation, "ignoring refresh from superseded client");
            return;
        }
        self.dispatch(&SessionEvent::refreshed(response));
    }

    /// Caller holds `transition` and has checked the generation.
    fn install_client(&self, client: Arc<dyn AuthClient>, user: Option<User>) {
        *self.client.write() = client;
        self.ready.store(true, Ordering::Release);

        tracing::info!(authenticated = user.is_some(), "authentication client ready");
        self.dispatch(&SessionEvent::ClientReady { user });
    }

    fn dispatch(&self, event: &SessionEvent) {
        self.snapshot.send_if_modified(|current| {
            let next = reduce(current, event);
            if Arc::ptr_eq(&next, current) {
                false
            } else {
                *current = next;
                true
            }
        });
        self.follow_user();
    }

    /// Keeps the token scheduler bound to the snapshot's user.
    fn follow_user(&self) {
        if !self.ready.load(Ordering::Acquire) {
            return;
        }
        let user_id = self
            .snapshot
            .borrow()
            .user
            .as_ref()
            .map(|user| user.id.clone());

        let mut tracked = self.tracked.lock();
        if tracked.as_ref().map(|t| t.user_id.as_str()) == user_id.as_deref() {
            return;
        }
        if let Some(previous) = tracked.take() {
            previous.tokens.teardown();
            self.token_state
                .send_if_modified(|state| state.apply(TokenAction::Reset));
        }

        if let Some(user_id) = user_id {
            tracing::debug!(%user_id, "starting access token refresh");
            let tokens = AccessTokenManager::spawn_on(
                &self.runtime(),
                self.client(),
                Arc::clone(&self.clock),
                self.options.refresh_policy,
                Arc::clone(&self.token_state),
                self.options.on_refresh_failure.clone(),
            );
            tokens.start();
            *tracked = Some(TrackedSession { user_id, tokens });
        }
    }

    fn stop_tracking(&self) {
        if let Some(previous) = self.tracked.lock().take() {
            previous.tokens.teardown();
        }
        self.token_state
            .send_if_modified(|state| state.apply(TokenAction::Reset));
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        self.abort_construction();
        if let Some(tracked) = self.tracked.get_mut().take() {
            tracked.tokens.teardown();
        }
    }
}

async fn construct(weak: Weak<ManagerInner>, generation: u64, config: ClientConfig) {
    // Let a burst of reconfigurations settle before touching the factory.
    tokio::task::yield_now().await;

    let (factory, hooks) = {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if !inner.is_current(generation) {
            return;
        }
        (Arc::clone(&inner.factory), inner.hooks(generation))
    };

    let result = factory.create_client(&config, hooks).await;
    let user = result.as_ref().ok().and_then(|client| client.get_user());

    let Some(inner) = weak.upgrade() else {
        return;
    };
    let _transition = inner.transition.lock();
    if !inner.is_current(generation) {
        tracing::debug!(generation, "discarding client of superseded configuration");
        return;
    }

    match result {
        Ok(client) => inner.install_client(client, user),
        Err(error) => {
            tracing::error!(%error, client_id = %config.client_id, "failed to create authentication client");
            inner.dispatch(&SessionEvent::ClientReady { user: None });
        }
    }
}
