//! Access token claims decoding.
//!
//! Tokens are compact JWTs (`header.payload.signature`). Only the payload is
//! decoded; the signature is never checked here because verification belongs
//! to the issuer and to the servers that accept the token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::Impersonator;
use crate::error::ClaimsError;

/// Claims carried by an access token.
///
/// Every field is optional so that tokens from different issuers (or older
/// token versions) still decode. Claims outside the known set are kept in
/// [`AccessTokenClaims::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessTokenClaims {
    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject (user id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Session id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Token id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Expiry as epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at as epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Active organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Primary role in the active organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// All roles in the active organization.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Permissions granted through the roles.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// Entitlements of the organization.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entitlements: Vec<String>,
    /// Feature flags enabled for the session.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feature_flags: Vec<String>,
    /// Actor performing an impersonation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Actor>,
    /// Any other claim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `act` claim of an impersonated session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting administrator (their email).
    pub sub: String,
    /// Reason given for the impersonation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AccessTokenClaims {
    /// Decodes the claims of `token`, failing with a distinguishable error.
    ///
    /// # Errors
    /// Returns a [`ClaimsError`] if the token is not a three-segment JWT or if
    /// its payload is not base64url-encoded JSON.
    pub fn decode(token: &str) -> Result<Self, ClaimsError> {
        decode_claims(token)
    }

    /// Returns the impersonator described by the `act` claim.
    #[must_use]
    pub fn impersonator(&self) -> Option<Impersonator> {
        self.act.as_ref().map(|act| Impersonator {
            email: act.sub.clone(),
            reason: act.reason.clone(),
        })
    }

    /// Returns a custom claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// Decodes the payload of `token` into any claims type.
///
/// # Errors
/// Returns a [`ClaimsError`] if the token is malformed or the payload does not
/// deserialize into `T`.
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> Result<T, ClaimsError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimsError::Malformed {
            segments: segments.len(),
        });
    }

    let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Lenient variant of [`decode_claims`]: a malformed token yields `None`.
#[must_use]
pub fn parse_claims(token: &str) -> Option<AccessTokenClaims> {
    decode_claims(token).ok()
}
