//! Vigil configuration structures.

use super::traits::{Configurable, Validatable};
use super::validation::{EnvOverride, ValidationContext, Validator};
use crate::credential::Credential;
use crate::error::{ConfigError, NetworkError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Main Vigil configuration.
///
/// # Example YAML
///
/// ```yaml
/// relay:
///   url: "wss://relay.example.com/ws"
///   connect_timeout_ms: 10000
///
/// api:
///   url: "https://relay.example.com/api"
///
/// oauth:
///   client_id: "5922"
///   redirect_uri: "http://localhost:3000/callback"
///
/// logging:
///   level: "info"
///   format: "pretty"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VigilConfig {
    /// Relay connection settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Relay REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// OAuth redirect settings.
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Validatable for VigilConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();

        ctx.enter("relay");
        self.relay.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("api");
        self.api.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("oauth");
        self.oauth.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("logging");
        self.logging.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.into_result()
    }
}

impl Configurable for VigilConfig {
    /// Applies overrides such as `VIGIL_RELAY_URL` or `VIGIL_LOG_LEVEL`.
    fn apply_env_overrides(&mut self, prefix: &str) {
        self.relay.apply_env_overrides(&format!("{prefix}_RELAY"));
        self.api.apply_env_overrides(&format!("{prefix}_API"));
        self.oauth.apply_env_overrides(&format!("{prefix}_OAUTH"));
        self.logging.apply_env_overrides(&format!("{prefix}_LOG"));
    }
}

/// Relay connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base address of the relay socket endpoint.
    #[serde(default = "default_relay_url")]
    pub url: String,

    /// Transport establishment timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_relay_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl RelayConfig {
    /// Returns the connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Builds the address for one connection: the base URL with the
    /// credential appended as the `token` query parameter.
    ///
    /// ```
    /// use vigil_core::Credential;
    /// use vigil_core::config::RelayConfig;
    ///
    /// let url = RelayConfig::default().endpoint(&Credential::new("abc123")).unwrap();
    /// assert_eq!(url.as_str(), "ws://localhost:8000/ws?token=abc123");
    /// ```
    pub fn endpoint(&self, credential: &Credential) -> Result<Url, NetworkError> {
        let mut url = Url::parse(&self.url).map_err(|e| NetworkError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("token", credential.expose());
        Ok(url)
    }

    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .require_non_empty("url", &self.url)
            .url_with_scheme("url", &self.url, &["ws", "wss"])
            .positive("connect_timeout_ms", self.connect_timeout_ms);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_URL"), &mut self.url);
        EnvOverride::apply_number(
            &format!("{prefix}_CONNECT_TIMEOUT_MS"),
            &mut self.connect_timeout_ms,
        );
    }
}

/// Relay REST API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API; endpoint paths are appended to it.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,

    /// How long a positive verification result is reused, in seconds.
    #[serde(default = "default_verify_cache_ttl_secs")]
    pub verify_cache_ttl_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_api_timeout_ms() -> u64 {
    20_000
}

fn default_verify_cache_ttl_secs() -> u64 {
    23 * 60 * 60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_ms: default_api_timeout_ms(),
            verify_cache_ttl_secs: default_verify_cache_ttl_secs(),
        }
    }
}

impl ApiConfig {
    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the verification cache lifetime as a `Duration`.
    #[must_use]
    pub fn verify_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.verify_cache_ttl_secs)
    }

    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .require_non_empty("url", &self.url)
            .url_with_scheme("url", &self.url, &["http", "https"])
            .positive("timeout_ms", self.timeout_ms);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_URL"), &mut self.url);
        EnvOverride::apply_number(&format!("{prefix}_TIMEOUT_MS"), &mut self.timeout_ms);
        EnvOverride::apply_number(
            &format!("{prefix}_VERIFY_CACHE_TTL_SECS"),
            &mut self.verify_cache_ttl_secs,
        );
    }
}

/// OAuth redirect configuration for the trading platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Authorization endpoint the user is redirected to.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// OAuth client id registered with the platform.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Redirect URI registered with the platform.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_auth_url() -> String {
    "https://live.tradovateapi.com/auth/oauth/authorize".to_string()
}

fn default_client_id() -> String {
    "5922".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/callback".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

impl OAuthConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .require_non_empty("client_id", &self.client_id)
            .require_non_empty("auth_url", &self.auth_url)
            .url_with_scheme("auth_url", &self.auth_url, &["http", "https"])
            .require_non_empty("redirect_uri", &self.redirect_uri)
            .url_with_scheme("redirect_uri", &self.redirect_uri, &["http", "https"]);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_AUTH_URL"), &mut self.auth_url);
        EnvOverride::apply_string(&format!("{prefix}_CLIENT_ID"), &mut self.client_id);
        EnvOverride::apply_string(&format!("{prefix}_REDIRECT_URI"), &mut self.redirect_uri);
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty, compact).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files. Logs go to stdout only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// File rotation (hourly, daily, never).
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
            rotation: default_rotation(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];
const ROTATIONS: &[&str] = &["hourly", "daily", "never"];

impl LoggingConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        check_one_of(ctx, "level", &self.level, LOG_LEVELS);
        check_one_of(ctx, "format", &self.format, LOG_FORMATS);
        check_one_of(ctx, "rotation", &self.rotation, ROTATIONS);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_LEVEL"), &mut self.level);
        EnvOverride::apply_string(&format!("{prefix}_FORMAT"), &mut self.format);
        EnvOverride::apply_optional_string(&format!("{prefix}_DIR"), &mut self.directory);
    }
}

fn check_one_of(ctx: &mut ValidationContext, field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value.to_lowercase().as_str()) {
        let error = ctx.invalid_value(field, format!("must be one of: {}", allowed.join(", ")));
        ctx.add_error(error);
    }
}
