//! Layered session settings.
//!
//! Settings are read from an optional file (any format the `config` crate
//! understands) and then from `SESSIONKIT_`-prefixed environment variables,
//! which take precedence:
//!
//! ```text
//! SESSIONKIT_CLIENT_ID=client_01
//! SESSIONKIT_REDIRECT_URI=https://app.example.com/callback
//! SESSIONKIT_REFRESH_BUFFER_SECONDS=120
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use sessionkit_application::SessionOptions;
use sessionkit_domain::auth::{
    MIN_REFRESH_DELAY_SECONDS, RETRY_DELAY_SECONDS, TOKEN_EXPIRY_BUFFER_SECONDS,
};
use sessionkit_domain::{ClientConfig, RefreshPolicy};
use url::Url;

/// Prefix of the environment variables read by [`SettingsLoader`].
pub const ENV_PREFIX: &str = "SESSIONKIT";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    /// No client id was configured.
    #[error("client_id is required (set it in the settings file or SESSIONKIT_CLIENT_ID)")]
    MissingClientId,

    /// The redirect URI is not an absolute URL.
    #[error("invalid redirect_uri {uri:?}: {source}")]
    InvalidRedirectUri {
        /// The configured value.
        uri: String,
        /// Why it did not parse.
        source: url::ParseError,
    },
}

/// Raw settings as they appear in files and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Application client id.
    #[serde(default)]
    pub client_id: String,
    /// API host override.
    #[serde(default)]
    pub api_hostname: Option<String>,
    /// Whether to use HTTPS towards the API host.
    #[serde(default)]
    pub https: Option<bool>,
    /// API port override.
    #[serde(default)]
    pub port: Option<u16>,
    /// Redirect URI after sign-in.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Development mode.
    #[serde(default)]
    pub dev_mode: bool,
    /// Refresh this many seconds before expiry.
    #[serde(default = "default_refresh_buffer")]
    pub refresh_buffer_seconds: u64,
    /// Minimum delay between proactive refreshes.
    #[serde(default = "default_min_refresh_delay")]
    pub min_refresh_delay_seconds: u64,
    /// Cooldown after a failed fetch.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

const fn default_refresh_buffer() -> u64 {
    TOKEN_EXPIRY_BUFFER_SECONDS
}

const fn default_min_refresh_delay() -> u64 {
    MIN_REFRESH_DELAY_SECONDS
}

const fn default_retry_delay() -> u64 {
    RETRY_DELAY_SECONDS
}

impl Settings {
    /// Validates the identity part of the settings.
    ///
    /// # Errors
    /// Returns an error if the client id is empty or the redirect URI does
    /// not parse.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let client_id = self.client_id.trim();
        if client_id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }

        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .map(|uri| {
                Url::parse(uri).map_err(|source| ConfigError::InvalidRedirectUri {
                    uri: uri.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(ClientConfig {
            client_id: client_id.to_string(),
            api_hostname: self.api_hostname.clone(),
            https: self.https,
            port: self.port,
            redirect_uri,
            dev_mode: self.dev_mode,
        })
    }

    /// The refresh timing part of the settings.
    #[must_use]
    pub const fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            expiry_buffer: Duration::from_secs(self.refresh_buffer_seconds),
            min_refresh_delay: Duration::from_secs(self.min_refresh_delay_seconds),
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
        }
    }

    /// Session manager options built from these settings.
    ///
    /// # Errors
    /// See [`client_config`](Self::client_config).
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        Ok(SessionOptions::new(self.client_config()?).with_refresh_policy(self.refresh_policy()))
    }
}

/// Builds [`Settings`] from a file layer and an environment layer.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    inline: Option<(String, FileFormat)>,
    environment: Option<Map<String, String>>,
}

impl SettingsLoader {
    /// A loader reading only the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` before the environment. The format follows the file
    /// extension, and the file must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads `contents` in `format` before the environment, after any file.
    #[must_use]
    pub fn with_contents(mut self, contents: impl Into<String>, format: FileFormat) -> Self {
        self.inline = Some((contents.into(), format));
        self
    }

    /// Uses `variables` instead of the process environment.
    #[must_use]
    pub fn with_environment(mut self, variables: Map<String, String>) -> Self {
        self.environment = Some(variables);
        self
    }

    /// Merges all layers into [`Settings`].
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or the merged values do
    /// not deserialize.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        if let Some((contents, format)) = &self.inline {
            builder = builder.add_source(File::from_str(contents, *format));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(self.environment.clone()),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!(
            client_id = %settings.client_id,
            refresh_buffer_seconds = settings.refresh_buffer_seconds,
            "loaded session settings"
        );
        Ok(settings)
    }

    /// Loads settings and turns them into session manager options.
    ///
    /// # Errors
    /// Returns an error if loading or validation fails.
    pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
        self.load()?.session_options()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn test_environment_only() {
        let settings = SettingsLoader::new()
            .with_environment(env(&[
                ("SESSIONKIT_CLIENT_ID", "client_01"),
                ("SESSIONKIT_DEV_MODE", "true"),
                ("SESSIONKIT_PORT", "8443"),
            ]))
            .load()
            .unwrap();

        assert_eq!(settings.client_id, "client_01");
        assert!(settings.dev_mode);
        assert_eq!(settings.port, Some(8443));
        assert_eq!(settings.refresh_buffer_seconds, 60);
        assert_eq!(settings.min_refresh_delay_seconds, 15);
        assert_eq!(settings.retry_delay_seconds, 300);
    }

    #[test]
    fn test_environment_overrides_file() {
        let options = SettingsLoader::new()
            .with_contents(
                r#"
                client_id = "from_file"
                api_hostname = "auth.example.com"
                redirect_uri = "https://app.example.com/callback"
                refresh_buffer_seconds = 90
                "#,
                FileFormat::Toml,
            )
            .with_environment(env(&[
                ("SESSIONKIT_CLIENT_ID", "from_env"),
                ("SESSIONKIT_REFRESH_BUFFER_SECONDS", "120"),
            ]))
            .session_options()
            .unwrap();

        assert_eq!(options.client.client_id, "from_env");
        assert_eq!(options.client.api_hostname.as_deref(), Some("auth.example.com"));
        assert_eq!(
            options.client.redirect_uri.unwrap().as_str(),
            "https://app.example.com/callback"
        );
        assert_eq!(options.refresh_policy.expiry_buffer, Duration::from_secs(120));
        assert_eq!(options.refresh_policy.retry_delay, Duration::from_secs(300));
    }

    #[test]
    fn test_missing_client_id() {
        let result = SettingsLoader::new()
            .with_environment(Map::new())
            .session_options();

        assert!(matches!(result, Err(ConfigError::MissingClientId)));
    }

    #[test]
    fn test_invalid_redirect_uri() {
        let result = SettingsLoader::new()
            .with_environment(env(&[
                ("SESSIONKIT_CLIENT_ID", "client_01"),
                ("SESSIONKIT_REDIRECT_URI", "not a url"),
            ]))
            .session_options();

        match result {
            Err(ConfigError::InvalidRedirectUri { uri, .. }) => assert_eq!(uri, "not a url"),
            other => panic!("expected InvalidRedirectUri, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SettingsLoader::new()
            .with_file("/nonexistent/sessionkit.toml")
            .with_environment(Map::new())
            .load();

        assert!(matches!(result, Err(ConfigError::Source(_))));
    }

    #[test]
    fn test_refresh_policy_conversion() {
        let settings = SettingsLoader::new()
            .with_environment(env(&[
                ("SESSIONKIT_CLIENT_ID", "client_01"),
                ("SESSIONKIT_MIN_REFRESH_DELAY_SECONDS", "5"),
                ("SESSIONKIT_RETRY_DELAY_SECONDS", "30"),
            ]))
            .load()
            .unwrap();

        assert_eq!(
            settings.refresh_policy(),
            RefreshPolicy {
                expiry_buffer: Duration::from_secs(60),
                min_refresh_delay: Duration::from_secs(5),
                retry_delay: Duration::from_secs(30),
            }
        );
    }
}
