//! User and authentication payload types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned user id.
    pub id: String,
    /// Primary email address.
    pub email: String,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user record last changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            email_verified: false,
            first_name: None,
            last_name: None,
            profile_picture_url: None,
            created_at: updated_at,
            updated_at,
        }
    }

    /// True when both values describe the same revision of the same user.
    #[must_use]
    pub fn same_revision(&self, other: &Self) -> bool {
        self.id == other.id && self.updated_at == other.updated_at
    }
}

/// An administrator impersonating the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impersonator {
    /// Email of the impersonating administrator.
    pub email: String,
    /// Reason given for the impersonation.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Payload delivered by the client whenever its tokens change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    /// The signed-in user.
    pub user: User,
    /// The new access token.
    pub access_token: String,
    /// The active organization, if any.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Impersonation metadata, if any.
    #[serde(default)]
    pub impersonator: Option<Impersonator>,
}

/// Parameters handed to the redirect callback after a sign-in round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectParams {
    /// Application state passed through the sign-in round trip.
    pub state: Option<Value>,
    /// The authentication that completed the redirect.
    pub response: AuthenticationResponse,
}

/// Options for sign-in and sign-up redirects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectOptions {
    /// Organization to sign into.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Pre-filled email address.
    #[serde(default)]
    pub login_hint: Option<String>,
    /// Application state returned through [`RedirectParams::state`].
    #[serde(default)]
    pub state: Option<Value>,
}

/// Options for signing out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOutOptions {
    /// Where the provider should send the browser afterwards.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Options for switching the active organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchOrganizationOptions {
    /// Organization to switch to.
    pub organization_id: String,
    /// Where the provider should send the browser afterwards, if it redirects.
    #[serde(default)]
    pub return_to: Option<String>,
}

impl SwitchOrganizationOptions {
    /// Switch to `organization_id` without a return location.
    #[must_use]
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            return_to: None,
        }
    }
}
