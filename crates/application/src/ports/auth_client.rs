//! Authentication client port

use async_trait::async_trait;
use sessionkit_domain::{
    AuthResult, RedirectOptions, SignOutOptions, SwitchOrganizationOptions, User,
};

/// Port for the external authentication client.
///
/// The client owns everything this crate does not: token issuance and
/// rotation, signature verification, network calls to the identity provider,
/// and credential storage. SessionKit only orchestrates it.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Starts the sign-in flow.
    ///
    /// # Errors
    /// Returns an error if the redirect cannot be started.
    async fn sign_in(&self, options: RedirectOptions) -> AuthResult<()>;

    /// Starts the sign-up flow.
    ///
    /// # Errors
    /// Returns an error if the redirect cannot be started.
    async fn sign_up(&self, options: RedirectOptions) -> AuthResult<()>;

    /// Returns the signed-in user, if any.
    fn get_user(&self) -> Option<User>;

    /// Returns a valid access token, rotating it first if the client decides
    /// the current one is stale.
    ///
    /// # Errors
    /// Returns [`sessionkit_domain::AuthError::LoginRequired`] when no session
    /// exists, or another error when the provider cannot be reached.
    async fn get_access_token(&self) -> AuthResult<String>;

    /// Ends the session.
    ///
    /// # Errors
    /// Returns an error if the sign-out cannot be performed.
    async fn sign_out(&self, options: SignOutOptions) -> AuthResult<()>;

    /// Switches the active organization and rotates the tokens accordingly.
    ///
    /// # Errors
    /// Returns an error if the switch is rejected.
    async fn switch_to_organization(&self, options: SwitchOrganizationOptions) -> AuthResult<()>;
}
