//! Meeting session configuration.
//!
//! Configuration is loaded from environment variables. The identity token is
//! redacted in Debug output.

use crate::controller::ControllerSettings;
use crate::gateway::{GatewaySettings, DEFAULT_IDENTITY_HEADER};
use common::config::ObservabilityConfig;
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default application origin; the SDK's leave URL is built from it.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";

/// Default UI language for the embedded client.
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Default location of the file-backed store.
pub const DEFAULT_STORE_PATH: &str = ".meeting-session/store.json";

/// Default gateway timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Meeting session configuration.
#[derive(Clone)]
pub struct Config {
    /// Prefix for root-relative API paths.
    pub api_base_path: Option<String>,

    /// Origin the application is served from (default: "http://localhost:5173").
    pub app_origin: String,

    /// UI language loaded into the embedded client (default: "zh-CN").
    pub locale: String,

    /// File-backed store location (default: ".meeting-session/store.json").
    pub store_path: PathBuf,

    /// Gateway request timeout (default: 10s).
    pub http_timeout: Duration,

    /// Ambient identity token from the hosting portal.
    /// Protected by `SecretString` to prevent accidental logging.
    pub identity_token: Option<SecretString>,

    /// Header the identity token is sent in (default: "Token").
    pub identity_header: String,

    pub observability: ObservabilityConfig,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_path", &self.api_base_path)
            .field("app_origin", &self.app_origin)
            .field("locale", &self.locale)
            .field("store_path", &self.store_path)
            .field("http_timeout", &self.http_timeout)
            .field(
                "identity_token",
                &self.identity_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("identity_header", &self.identity_header)
            .field("observability", &self.observability)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable values.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let api_base_path = non_empty("MS_API_BASE_PATH").map(str::to_string);

        let app_origin = non_empty("MS_APP_ORIGIN")
            .unwrap_or(DEFAULT_APP_ORIGIN)
            .trim_end_matches('/')
            .to_string();

        let locale = non_empty("MS_LOCALE").unwrap_or(DEFAULT_LOCALE).to_string();

        let store_path = PathBuf::from(non_empty("MS_STORE_PATH").unwrap_or(DEFAULT_STORE_PATH));

        let http_timeout_seconds = match non_empty("MS_HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "MS_HTTP_TIMEOUT_SECONDS must be a positive integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECONDS,
        };

        // Whitespace is kept as-is; only an empty token means "no identity"
        let identity_token = vars
            .get("MS_IDENTITY_TOKEN")
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.clone()));

        let identity_header = non_empty("MS_IDENTITY_HEADER")
            .unwrap_or(DEFAULT_IDENTITY_HEADER)
            .to_string();

        Ok(Config {
            api_base_path,
            app_origin,
            locale,
            store_path,
            http_timeout: Duration::from_secs(http_timeout_seconds),
            identity_token,
            identity_header,
            observability: ObservabilityConfig::from_vars(vars),
        })
    }

    /// Settings for the gateway client. Without an explicit base path,
    /// root-relative endpoints resolve against the application origin.
    #[must_use]
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            base_path: Some(
                self.api_base_path
                    .clone()
                    .unwrap_or_else(|| self.app_origin.clone()),
            ),
            timeout: self.http_timeout,
            identity_header: self.identity_header.clone(),
        }
    }

    /// Settings for a meeting session controller.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings::new(&self.app_origin, &self.locale)
    }

    /// Whether an identity token was configured.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.identity_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::{CONFIG_PATH, SIGNATURE_PATH};
    use crate::gateway::GatewayClient;
    use crate::notify::ErrorChannel;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&HashMap::new()).unwrap();

        assert_eq!(config.api_base_path, None);
        assert_eq!(config.app_origin, DEFAULT_APP_ORIGIN);
        assert_eq!(config.locale, DEFAULT_LOCALE);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(!config.has_identity());
        assert_eq!(config.identity_header, "Token");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(&vars(&[
            ("MS_API_BASE_PATH", "https://portal.example.com/apps/meeting"),
            ("MS_APP_ORIGIN", "https://meet.example.com/"),
            ("MS_LOCALE", "en-US"),
            ("MS_STORE_PATH", "/tmp/ms.json"),
            ("MS_HTTP_TIMEOUT_SECONDS", "3"),
            ("MS_IDENTITY_TOKEN", "portal-token"),
            ("MS_IDENTITY_HEADER", "Authorization"),
            ("MS_JSON_LOGS", "true"),
        ]))
        .unwrap();

        assert_eq!(
            config.api_base_path.as_deref(),
            Some("https://portal.example.com/apps/meeting")
        );
        assert_eq!(config.app_origin, "https://meet.example.com");
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.has_identity());
        assert!(config.observability.json_logs);

        let gateway = config.gateway_settings();
        assert_eq!(
            gateway.base_path.as_deref(),
            Some("https://portal.example.com/apps/meeting")
        );
        assert_eq!(gateway.identity_header, "Authorization");
        assert_eq!(gateway.timeout, Duration::from_secs(3));

        assert_eq!(
            config.controller_settings().leave_url,
            "https://meet.example.com/leave"
        );
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for raw in ["abc", "0", "-1"] {
            let result = Config::from_vars(&vars(&[("MS_HTTP_TIMEOUT_SECONDS", raw)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_identity_token() {
        let config = Config::from_vars(&vars(&[("MS_IDENTITY_TOKEN", "portal-token")])).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("portal-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_default_gateway_resolves_against_app_origin() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        let gateway =
            GatewayClient::new(config.gateway_settings(), None, ErrorChannel::new()).unwrap();

        assert_eq!(
            gateway.resolve_url(CONFIG_PATH),
            "http://localhost:5173/api/config"
        );
        assert_eq!(
            gateway.resolve_url(SIGNATURE_PATH),
            "http://localhost:5173/api/signature"
        );
    }
}
