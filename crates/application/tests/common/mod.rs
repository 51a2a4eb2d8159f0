//! Test doubles shared by the application integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use sessionkit_application::{AuthClient, ClientFactory, ClientHooks, Clock};
use sessionkit_domain::{
    AuthError, AuthResult, AuthenticationResponse, ClientConfig, RedirectOptions, SignOutOptions,
    SwitchOrganizationOptions, User,
};

/// Epoch seconds every test treats as "now".
pub const NOW: i64 = 1_700_000_000;

/// A clock pinned to [`NOW`].
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(NOW, 0).unwrap()
    }
}

/// Encodes `claims` as an unsigned compact token.
pub fn mint(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// A token for `user_01` expiring `seconds` after [`NOW`].
pub fn token_expiring_in(seconds: i64) -> String {
    mint(&json!({ "sub": "user_01", "exp": NOW + seconds }))
}

pub fn user(id: &str) -> User {
    User::new(id, format!("{id}@example.com"), Utc.timestamp_opt(NOW, 0).unwrap())
}

pub fn response(user: User, access_token: String) -> AuthenticationResponse {
    AuthenticationResponse {
        user,
        access_token,
        organization_id: None,
        impersonator: None,
    }
}

/// A scripted authentication client.
#[derive(Default)]
pub struct MockClient {
    user: Mutex<Option<User>>,
    tokens: Mutex<VecDeque<AuthResult<String>>>,
    gate: Option<Arc<Semaphore>>,
    user_barrier: Option<Arc<Barrier>>,
    user_reads: AtomicUsize,
    token_calls: AtomicUsize,
    signed_out: AtomicBool,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        *self.user.lock() = Some(user);
        self
    }

    /// Tokens handed out in order; `LoginRequired` once exhausted.
    pub fn with_tokens(self, tokens: impl IntoIterator<Item = AuthResult<String>>) -> Self {
        self.tokens.lock().extend(tokens);
        self
    }

    /// Every token request waits for a permit of `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// `get_user` blocks the calling thread on `barrier` twice: once on
    /// entry and once more before returning.
    pub fn blocking_user(mut self, barrier: Arc<Barrier>) -> Self {
        self.user_barrier = Some(barrier);
        self
    }

    /// Completed `get_user` calls.
    pub fn user_reads(&self) -> usize {
        self.user_reads.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn is_signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthClient for MockClient {
    async fn sign_in(&self, _options: RedirectOptions) -> AuthResult<()> {
        Ok(())
    }

    async fn sign_up(&self, _options: RedirectOptions) -> AuthResult<()> {
        Ok(())
    }

    fn get_user(&self) -> Option<User> {
        if let Some(barrier) = &self.user_barrier {
            barrier.wait();
            barrier.wait();
        }
        let user = self.user.lock().clone();
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        user
    }

    async fn get_access_token(&self) -> AuthResult<String> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.tokens
            .lock()
            .pop_front()
            .unwrap_or(Err(AuthError::LoginRequired))
    }

    async fn sign_out(&self, _options: SignOutOptions) -> AuthResult<()> {
        self.signed_out.store(true, Ordering::SeqCst);
        *self.user.lock() = None;
        Ok(())
    }

    async fn switch_to_organization(&self, _options: SwitchOrganizationOptions) -> AuthResult<()> {
        Ok(())
    }
}

/// Hands out registered clients by client id and records the hooks it got.
#[derive(Default)]
pub struct MockFactory {
    clients: Mutex<HashMap<String, Arc<MockClient>>>,
    hooks: Mutex<Vec<ClientHooks>>,
    requested: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(self, client_id: &str, client: Arc<MockClient>) -> Self {
        self.clients.lock().insert(client_id.to_string(), client);
        self
    }

    /// Every construction waits for a permit of `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Hooks passed to the `index`-th construction.
    pub fn hooks(&self, index: usize) -> ClientHooks {
        self.hooks.lock()[index].clone()
    }

    /// Client ids of every construction started so far.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn create_client(
        &self,
        config: &ClientConfig,
        hooks: ClientHooks,
    ) -> AuthResult<Arc<dyn AuthClient>> {
        self.requested.lock().push(config.client_id.clone());
        self.hooks.lock().push(hooks);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let client = self.clients.lock().get(&config.client_id).cloned();
        match client {
            Some(client) => Ok(client as Arc<dyn AuthClient>),
            None => Err(AuthError::ClientCreation {
                message: format!("unknown client id {}", config.client_id),
            }),
        }
    }
}
