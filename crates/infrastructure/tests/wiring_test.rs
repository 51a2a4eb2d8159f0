//! Integration tests wiring settings, the system clock and a session manager.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use config::Map;
use sessionkit_application::{AuthClient, ClientFactory, ClientHooks, SessionManager};
use sessionkit_domain::{AuthError, AuthResult, ClientConfig, SessionStatus};
use sessionkit_infrastructure::{SettingsLoader, SystemClock};

/// Rejects every configuration, recording the one it saw.
#[derive(Default)]
struct RejectingFactory {
    seen: parking_lot::Mutex<Option<ClientConfig>>,
}

#[async_trait]
impl ClientFactory for RejectingFactory {
    async fn create_client(
        &self,
        config: &ClientConfig,
        _hooks: ClientHooks,
    ) -> AuthResult<Arc<dyn AuthClient>> {
        *self.seen.lock() = Some(config.clone());
        Err(AuthError::ClientCreation {
            message: "offline".to_string(),
        })
    }
}

#[tokio::test]
async fn test_settings_drive_session_manager() {
    let environment: Map<String, String> = [
        ("SESSIONKIT_CLIENT_ID", "client_01"),
        ("SESSIONKIT_API_HOSTNAME", "auth.example.com"),
        ("SESSIONKIT_REFRESH_BUFFER_SECONDS", "30"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    let options = SettingsLoader::new()
        .with_environment(environment)
        .session_options()
        .unwrap();
    assert_eq!(options.refresh_policy.expiry_buffer, Duration::from_secs(30));

    let factory = Arc::new(RejectingFactory::default());
    let manager = SessionManager::new(options, Arc::clone(&factory) as _, Arc::new(SystemClock::new()));
    manager.start();

    let mut rx = manager.subscribe();
    rx.wait_for(|snapshot| snapshot.status == SessionStatus::Unauthenticated)
        .await
        .unwrap();

    let seen = factory.seen.lock().clone().unwrap();
    assert_eq!(seen.client_id, "client_01");
    assert_eq!(seen.api_base_url().as_deref(), Some("https://auth.example.com"));
    assert_eq!(
        manager.client().get_access_token().await,
        Err(AuthError::LoginRequired)
    );
}
