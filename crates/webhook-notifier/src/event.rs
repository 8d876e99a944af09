// crates/webhook-notifier/src/event.rs
// ============================================================================
// Module: Notification Events
// Description: Read-only model of the events handed to the notifier.
// Purpose: Carry message, severity and metadata into payload rendering.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`Event`] mirrors the upstream event schema closely enough for rendering.
//! The notifier only reads events; it never mutates or stores them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Metadata key selecting the payload rendering.
pub const COMMIT_STATUS_KEY: &str = "commit_status";

/// `commit_status` value that selects the update card rendering.
pub const COMMIT_STATUS_UPDATE: &str = "update";

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Reference to the object an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    /// Object kind, for example `Kustomization`.
    #[serde(default)]
    pub kind: String,
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Object namespace.
    #[serde(default)]
    pub namespace: String,
}

/// Event delivered to the notifier.
///
/// # Invariants
/// - Any `severity` string is accepted.
/// - Metadata keys are unique; iteration order is sorted and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Free-text message.
    #[serde(default)]
    pub message: String,
    /// Severity level, usually `info` or `error`.
    #[serde(default)]
    pub severity: String,
    /// String metadata attached by the emitter.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Object the event concerns, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involved_object: Option<ObjectReference>,
    /// Short machine-readable reason, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Event {
    /// Creates an event with the given message and severity and no metadata.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: severity.into(),
            ..Self::default()
        }
    }

    /// Adds a metadata entry, replacing any previous value for the key.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the involved object reference.
    #[must_use]
    pub fn with_involved_object(
        mut self,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        self.involved_object = Some(ObjectReference {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
        });
        self
    }

    /// Returns the `commit_status` metadata value, if any.
    #[must_use]
    pub fn commit_status(&self) -> Option<&str> {
        self.metadata.get(COMMIT_STATUS_KEY).map(String::as_str)
    }

    /// Classifies the severity string.
    #[must_use]
    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::classify(&self.severity)
    }
}

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Coarse severity classification used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityLevel {
    /// Informational event.
    Info,
    /// Error event.
    Error,
    /// Any other severity string, including empty.
    Other,
}

impl SeverityLevel {
    /// Classifies a severity string case-insensitively.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("error") {
            Self::Error
        } else if raw.eq_ignore_ascii_case("info") {
            Self::Info
        } else {
            Self::Other
        }
    }

    /// Status emoji shown in rendered messages.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Error => "\u{1f4a3}",
            Self::Info | Self::Other => "\u{2705}",
        }
    }
}
