// crates/webhook-notifier/src/error.rs
// ============================================================================
// Module: Webhook Notifier Errors
// Description: Error taxonomy for notifier construction and delivery.
// Purpose: Separate setup failures from transport and endpoint failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Construction returns [`ConfigurationError`]. Delivery returns
//! [`NotifierError`], which wraps either a [`TransportError`] (the request never
//! produced a response) or a [`DeliveryError`] (the endpoint answered with a
//! non-success status).
//! Invariants:
//! - Errors never carry the authentication token.
//! - No variant implies that a retry was attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Errors raised while constructing a notifier.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Base URL or composed endpoint failed to parse.
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),
    /// URL scheme is not `http` or `https`.
    #[error("unsupported webhook url scheme: {0}")]
    UnsupportedScheme(String),
    /// Token cannot be carried in an HTTP header.
    #[error("token is not a valid header value")]
    InvalidToken,
    /// Trust root bytes did not yield any usable certificate.
    #[error("invalid trust root: {0}")]
    InvalidTrustRoot(String),
    /// Proxy URL was rejected.
    #[error("invalid proxy url: {0}")]
    InvalidProxy(String),
    /// A numeric or textual setting is out of range.
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// Offending config field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Failures that prevented a response from being received.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The delivery context was cancelled.
    #[error("delivery cancelled")]
    Cancelled,
    /// The delivery context deadline elapsed.
    #[error("delivery deadline exceeded")]
    DeadlineExceeded,
    /// The client request timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Connection could not be established (DNS, refused, TLS handshake).
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
    /// Payload serialization failed.
    #[error("payload encoding failed: {0}")]
    Encode(String),
}

impl TransportError {
    /// Returns a stable label for telemetry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Timeout(_) => "timeout",
            Self::Connect(_) => "connect",
            Self::Request(_) => "request",
            Self::Encode(_) => "encode",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Delivery Errors
// ============================================================================

/// Endpoint answered with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("webhook responded with status {status}")]
pub struct DeliveryError {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded lossily and capped at the configured limit.
    pub body: String,
    /// True when the body exceeded the limit and was cut short.
    pub truncated: bool,
}

// ============================================================================
// SECTION: Notifier Errors
// ============================================================================

/// Errors returned by [`crate::WebhookNotifier::deliver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifierError {
    /// Transport-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Non-success HTTP status.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl NotifierError {
    /// Returns true for transport failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true for non-success HTTP responses.
    #[must_use]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }

    /// Returns the HTTP status for delivery errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Delivery(err) => Some(err.status),
            Self::Transport(_) => None,
        }
    }

    /// Returns a stable label for telemetry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(err) => err.kind(),
            Self::Delivery(_) => "http_status",
        }
    }
}
