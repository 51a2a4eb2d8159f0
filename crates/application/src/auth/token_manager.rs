//! Proactive access token refresh.
//!
//! The manager owns a single timer and a "currently fetching" latch. Timer
//! tasks never fetch themselves: they only send a tick to a driver task that
//! performs the fetch, so tearing the manager down is a matter of aborting
//! two handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use sessionkit_domain::{AccessTokenState, AuthResult, RefreshPolicy, TokenAction};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::hooks::RefreshFailureCallback;
use crate::ports::{AuthClient, Clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Re-request once when the first token is near expiry.
    Proactive,
    /// Single request.
    Manual,
}

struct PendingRefresh {
    due: Instant,
    handle: JoinHandle<()>,
}

/// Releases the fetch latch on drop.
struct FetchGuard<'a>(&'a AtomicBool);

impl<'a> FetchGuard<'a> {
    fn acquire(latch: &'a AtomicBool) -> Option<Self> {
        latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(latch))
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    client: Arc<dyn AuthClient>,
    clock: Arc<dyn Clock>,
    policy: RefreshPolicy,
    state: Arc<watch::Sender<AccessTokenState>>,
    on_failure: Option<RefreshFailureCallback>,
    runtime: Handle,
    fetching: AtomicBool,
    active: AtomicBool,
    pending: Mutex<Option<PendingRefresh>>,
    driver: Mutex<Option<JoinHandle<()>>>,
    ticks: mpsc::UnboundedSender<()>,
}

/// Keeps an access token fresh ahead of its expiry.
///
/// Cloning is cheap; all clones share the same timer and latch.
#[derive(Clone)]
pub struct AccessTokenManager {
    inner: Arc<Inner>,
}

impl AccessTokenManager {
    /// Creates a manager publishing into `state` and spawns its driver task.
    ///
    /// Must be called from within a Tokio runtime. Nothing is fetched until
    /// [`start`](Self::start) or one of the fetch methods is called.
    #[must_use]
    pub fn spawn(
        client: Arc<dyn AuthClient>,
        clock: Arc<dyn Clock>,
        policy: RefreshPolicy,
        state: Arc<watch::Sender<AccessTokenState>>,
        on_failure: Option<RefreshFailureCallback>,
    ) -> Self {
        Self::spawn_on(&Handle::current(), client, clock, policy, state, on_failure)
    }

    /// Like [`spawn`](Self::spawn), but runs the driver and every timer on
    /// `runtime`, so it may be called from any thread.
    #[must_use]
    pub fn spawn_on(
        runtime: &Handle,
        client: Arc<dyn AuthClient>,
        clock: Arc<dyn Clock>,
        policy: RefreshPolicy,
        state: Arc<watch::Sender<AccessTokenState>>,
        on_failure: Option<RefreshFailureCallback>,
    ) -> Self {
        let (ticks, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            client,
            clock,
            policy,
            state,
            on_failure,
            runtime: runtime.clone(),
            fetching: AtomicBool::new(false),
            active: AtomicBool::new(true),
            pending: Mutex::new(None),
            driver: Mutex::new(None),
            ticks,
        });

        let driver = runtime.spawn(drive(Arc::downgrade(&inner), rx));
        *inner.driver.lock() = Some(driver);

        Self { inner }
    }

    /// Kicks off the first proactive fetch in the background.
    pub fn start(&self) {
        self.inner.tick();
    }

    /// Fetches a token, re-requesting once if the first one is near expiry
    /// or unreadable, then schedules the next refresh.
    ///
    /// Returns `Ok(None)` without fetching when a fetch is already in flight
    /// or the manager was torn down.
    ///
    /// # Errors
    /// Returns the client's error when the fetch fails. The error is also
    /// published and a retry is scheduled.
    pub async fn ensure_fresh(&self) -> AuthResult<Option<String>> {
        self.inner.fetch(FetchMode::Proactive).await
    }

    /// Fetches a token once, sharing the latch and scheduling rules of
    /// [`ensure_fresh`](Self::ensure_fresh).
    ///
    /// # Errors
    /// Returns the client's error when the fetch fails.
    pub async fn refresh(&self) -> AuthResult<Option<String>> {
        self.inner.fetch(FetchMode::Manual).await
    }

    /// Cancels the pending timer and the driver. Results of fetches still in
    /// flight are discarded.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    /// Returns true while a fetch is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.inner.fetching.load(Ordering::Acquire)
    }

    /// Returns false once torn down.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Time left until the scheduled refresh, if one is pending.
    #[must_use]
    pub fn next_refresh_in(&self) -> Option<Duration> {
        self.inner
            .pending
            .lock()
            .as_ref()
            .filter(|pending| !pending.handle.is_finished())
            .map(|pending| pending.due.saturating_duration_since(Instant::now()))
    }

    /// Current token state.
    #[must_use]
    pub fn state(&self) -> AccessTokenState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to token state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AccessTokenState> {
        self.inner.state.subscribe()
    }
}

impl std::fmt::Debug for AccessTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenManager")
            .field("policy", &self.inner.policy)
            .field("active", &self.is_active())
            .field("fetching", &self.is_fetching())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn tick(&self) {
        if self.is_active() {
            let _ = self.ticks.send(());
        }
    }

    async fn fetch(&self, mode: FetchMode) -> AuthResult<Option<String>> {
        if !self.is_active() {
            return Ok(None);
        }
        let Some(_guard) = FetchGuard::acquire(&self.fetching) else {
            tracing::trace!("token fetch already in flight");
            return Ok(None);
        };

        self.publish(TokenAction::FetchStarted);
        let result = match self.client.get_access_token().await {
            Ok(token) if mode == FetchMode::Proactive && self.needs_second_fetch(&token) => {
                tracing::debug!("access token near expiry, requesting again");
                self.client.get_access_token().await
            }
            other => other,
        };

        if !self.is_active() {
            tracing::debug!("discarding token fetch result after teardown");
            return Ok(None);
        }

        match result {
            Ok(token) => {
                self.publish(TokenAction::FetchSucceeded(token.clone()));
                match self.policy.describe(&token, self.clock.epoch_seconds()) {
                    Some(descriptor) => {
                        self.schedule(self.policy.refresh_delay(descriptor.seconds_until_expiry));
                    }
                    None => tracing::debug!("access token has no readable expiry"),
                }
                Ok(Some(token))
            }
            Err(error) => {
                tracing::warn!(%error, "access token fetch failed");
                self.publish(TokenAction::FetchFailed(error.clone()));
                if let Some(callback) = &self.on_failure {
                    callback(&error);
                }
                self.schedule(self.policy.retry_delay);
                Err(error)
            }
        }
    }

    fn needs_second_fetch(&self, token: &str) -> bool {
        self.policy
            .describe(token, self.clock.epoch_seconds())
            .is_none_or(|descriptor| descriptor.is_near_expiry)
    }

    fn publish(&self, action: TokenAction) {
        self.state
            .send_if_modified(|state| self.is_active() && state.apply(action));
    }

    fn schedule(&self, delay: Duration) {
        if !self.is_active() {
            return;
        }
        tracing::debug!(delay_secs = delay.as_secs(), "scheduling access token refresh");

        let ticks = self.ticks.clone();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = ticks.send(());
        });
        let next = PendingRefresh {
            due: Instant::now() + delay,
            handle,
        };
        if let Some(previous) = self.pending.lock().replace(next) {
            previous.handle.abort();
        }
    }

    fn teardown(&self) {
        self.active.store(false, Ordering::Release);
        if let Some(pending) = self.pending.lock().take() {
            pending.handle.abort();
        }
        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn drive(weak: Weak<Inner>, mut ticks: mpsc::UnboundedReceiver<()>) {
    while ticks.recv().await.is_some() {
        let Some(inner) = weak.upgrade() else {
            break;
        };
        // Errors are already published and retried.
        let _ = inner.fetch(FetchMode::Proactive).await;
    }
}
