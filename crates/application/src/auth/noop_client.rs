//! Placeholder client used until the real one is ready.

use async_trait::async_trait;
use sessionkit_domain::{
    AuthError, AuthResult, RedirectOptions, SignOutOptions, SwitchOrganizationOptions, User,
};

use crate::ports::AuthClient;

/// A client that does nothing.
///
/// Installed while the real client is being constructed so consumers never
/// observe a missing capability. Token requests fail with
/// [`AuthError::LoginRequired`]; everything else succeeds without effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

#[async_trait]
impl AuthClient for NoopClient {
    async fn sign_in(&self, _options: RedirectOptions) -> AuthResult<()> {
        Ok(())
    }

    async fn sign_up(&self, _options: RedirectOptions) -> AuthResult<()> {
        Ok(())
    }

    fn get_user(&self) -> Option<User> {
        None
    }

    async fn get_access_token(&self) -> AuthResult<String> {
        Err(AuthError::LoginRequired)
    }

    async fn sign_out(&self, _options: SignOutOptions) -> AuthResult<()> {
        Ok(())
    }

    async fn switch_to_organization(&self, _options: SwitchOrganizationOptions) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_client_capabilities() {
        let client = NoopClient;
        assert!(client.get_user().is_none());
        assert_eq!(client.get_access_token().await, Err(AuthError::LoginRequired));
        assert_eq!(client.sign_in(RedirectOptions::default()).await, Ok(()));
        assert_eq!(client.sign_up(RedirectOptions::default()).await, Ok(()));
        assert_eq!(client.sign_out(SignOutOptions::default()).await, Ok(()));
        assert_eq!(
            client
                .switch_to_organization(SwitchOrganizationOptions::new("org_01"))
                .await,
            Ok(())
        );
    }
}
