//! Client factory port

use std::sync::Arc;

use async_trait::async_trait;
use sessionkit_domain::{AuthResult, ClientConfig};

use super::AuthClient;
use crate::auth::ClientHooks;

/// Port for constructing the external authentication client.
///
/// The session manager calls this once per identity configuration. The
/// `hooks` must be retained by the client: `hooks.on_refresh` is the only way
/// token changes reach the session snapshot.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Builds a client for `config`.
    ///
    /// # Errors
    /// Returns an error if the client cannot be initialized; the session then
    /// settles as unauthenticated.
    async fn create_client(
        &self,
        config: &ClientConfig,
        hooks: ClientHooks,
    ) -> AuthResult<Arc<dyn AuthClient>>;
}
