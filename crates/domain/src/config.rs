//! Client identity configuration.

use serde::{Deserialize, Serialize};
use url::Url;

/// Identifies which tenant/application the authentication client talks to.
///
/// Two configs share an identity when [`same_identity`](Self::same_identity)
/// holds; any identity change tears down the running session and builds a new
/// client. `dev_mode` is not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application client id issued by the identity provider.
    pub client_id: String,
    /// API host override.
    #[serde(default)]
    pub api_hostname: Option<String>,
    /// Whether to talk to the API host over HTTPS.
    #[serde(default)]
    pub https: Option<bool>,
    /// API port override.
    #[serde(default)]
    pub port: Option<u16>,
    /// Where the provider redirects after sign-in.
    #[serde(default)]
    pub redirect_uri: Option<Url>,
    /// Development mode (relaxed cookie and storage rules in the client).
    #[serde(default)]
    pub dev_mode: bool,
}

impl ClientConfig {
    /// Creates a config with only the client id set.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            api_hostname: None,
            https: None,
            port: None,
            redirect_uri: None,
            dev_mode: false,
        }
    }

    /// Sets the API host.
    #[must_use]
    pub fn with_api_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.api_hostname = Some(hostname.into());
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: Url) -> Self {
        self.redirect_uri = Some(uri);
        self
    }

    /// Returns true when both configs address the same tenant/application.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.client_id == other.client_id
            && self.api_hostname == other.api_hostname
            && self.https == other.https
            && self.port == other.port
            && self.redirect_uri == other.redirect_uri
    }

    /// Base URL of the API host, when a host override is configured.
    #[must_use]
    pub fn api_base_url(&self) -> Option<String> {
        let host = self.api_hostname.as_deref()?;
        let scheme = if self.https.unwrap_or(true) { "https" } else { "http" };
        Some(match self.port {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = ClientConfig::new("client_01");
        let b = ClientConfig::new("client_01");
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_api_hostname("auth.example.com"));
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&b.with_api_hostname("auth.example.com")));
    }

    #[test]
    fn test_dev_mode_is_not_identity() {
        let a = ClientConfig::new("client_01");
        let mut b = a.clone();
        b.dev_mode = true;

        assert_ne!(a, b);
        assert!(a.same_identity(&b));
    }

    #[test]
    fn test_api_base_url() {
        assert_eq!(ClientConfig::new("c").api_base_url(), None);

        let mut config = ClientConfig::new("c").with_api_hostname("localhost");
        assert_eq!(config.api_base_url().as_deref(), Some("https://localhost"));

        config.https = Some(false);
        config.port = Some(8080);
        assert_eq!(
            config.api_base_url().as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"client_id":"client_01","redirect_uri":"https://app.example.com/callback"}"#,
        )
        .unwrap();
        assert_eq!(config.client_id, "client_01");
        assert!(!config.dev_mode);
        assert_eq!(
            config.redirect_uri.unwrap().as_str(),
            "https://app.example.com/callback"
        );
    }
}
