// crates/webhook-notifier/src/lib.rs
// ============================================================================
// Module: Webhook Notifier Library
// Description: Webex webhook notifier for structured events.
// Purpose: Render events and deliver them with one HTTP POST per call.
// Dependencies: reqwest, rustls, serde, thiserror, tokio, url
// ============================================================================

//! ## Overview
//! Webhook Notifier turns an [`Event`] into a [`WebexPayload`] and posts it to
//! a chat webhook through [`WebhookNotifier::deliver`].
//! Invariants:
//! - Construction validates the URL and token; delivery never re-validates them.
//! - One delivery sends at most one request and never retries.
//! - Custom trust roots are scoped to the notifier that was built with them.
//!
//! Security posture: event content and trust-root bytes are untrusted; the
//! token is kept out of payloads, errors, and telemetry.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod notifier;
pub mod payload;
pub mod telemetry;
pub mod trust;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::NotifierConfig;
pub use context::CancelHandle;
pub use context::DeliveryContext;
pub use error::ConfigurationError;
pub use error::DeliveryError;
pub use error::NotifierError;
pub use error::TransportError;
pub use event::COMMIT_STATUS_KEY;
pub use event::Event;
pub use event::ObjectReference;
pub use event::SeverityLevel;
pub use notifier::WebhookNotifier;
pub use payload::Rendering;
pub use payload::WebexPayload;
pub use telemetry::DeliveryObserver;
pub use telemetry::DeliveryOutcome;
pub use telemetry::DeliveryRecord;
pub use telemetry::JsonLineObserver;
pub use telemetry::NoopObserver;
pub use trust::TrustRoot;
