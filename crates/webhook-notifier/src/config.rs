// crates/webhook-notifier/src/config.rs
// ============================================================================
// Module: Notifier Configuration
// Description: Construction-time settings for the webhook notifier.
// Purpose: Capture endpoint, credentials, and client limits in one value.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! [`NotifierConfig`] is immutable once a notifier is built. It derives
//! `Deserialize` so an embedding controller can load it from TOML or JSON;
//! loading and secret handling stay with the caller.
//! Invariants:
//! - `timeout_ms` and `max_response_bytes` are non-zero after [`NotifierConfig::validate`].
//! - The token never appears in `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigurationError;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Default cap on error response bodies, in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "webhook-notifier/0.1";

/// Serde default for `timeout_ms`.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Serde default for `max_response_bytes`.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Serde default for `user_agent`.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Settings for a [`crate::WebhookNotifier`].
///
/// # Invariants
/// - `url` must be an absolute `http` or `https` URL.
/// - An empty `path_suffix` leaves `url` unchanged.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    /// Webhook base URL.
    pub url: String,
    /// Optional path appended to `url`.
    #[serde(default)]
    pub path_suffix: String,
    /// Destination room identifier.
    pub channel: String,
    /// Bearer token.
    pub token: String,
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum error response body retained, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional HTTP(S) proxy for all requests.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl NotifierConfig {
    /// Creates a config with default limits.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        path_suffix: impl Into<String>,
        channel: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            path_suffix: path_suffix.into(),
            channel: channel.into(),
            token: token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_url: None,
        }
    }

    /// Checks numeric limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] for zero limits.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.timeout_ms == 0 {
            return Err(ConfigurationError::InvalidSetting {
                field: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigurationError::InvalidSetting {
                field: "max_response_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Composes and validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the URL is malformed or not HTTP(S).
    pub fn endpoint(&self) -> Result<Url, ConfigurationError> {
        compose_endpoint(&self.url, &self.path_suffix)
    }
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("url", &self.url)
            .field("path_suffix", &self.path_suffix)
            .field("channel", &self.channel)
            .field("token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("user_agent", &self.user_agent)
            .field("proxy_url", &self.proxy_url)
            .finish()
    }
}

// ============================================================================
// SECTION: Endpoint Composition
// ============================================================================

/// Joins `base` and `suffix` with a single `/` and validates the result.
///
/// # Errors
///
/// Returns [`ConfigurationError`] when either URL fails to parse, uses a
/// non-HTTP scheme, or has no host.
pub fn compose_endpoint(base: &str, suffix: &str) -> Result<Url, ConfigurationError> {
    let base_url = parse_http_url(base)?;
    if suffix.is_empty() {
        return Ok(base_url);
    }
    let joined =
        format!("{}/{}", base.trim_end_matches('/'), suffix.trim_start_matches('/'));
    parse_http_url(&joined)
}

/// Parses an absolute HTTP(S) URL with a host.
fn parse_http_url(raw: &str) -> Result<Url, ConfigurationError> {
    let url = Url::parse(raw).map_err(|err| ConfigurationError::InvalidUrl(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(ConfigurationError::UnsupportedScheme(scheme.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigurationError::InvalidUrl("missing host".to_string()));
    }
    Ok(url)
}
