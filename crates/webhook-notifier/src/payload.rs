// crates/webhook-notifier/src/payload.rs
// ============================================================================
// Module: Webex Payloads
// Description: Wire model and renderers for Webex message payloads.
// Purpose: Turn an event into the JSON body posted to the webhook.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`WebexPayload`] is built fresh for each delivery and discarded after
//! serialization. [`Rendering`] picks between the default markdown message and
//! the adaptive card used for commit status updates.
//! Invariants:
//! - `text` is always present so clients without card support still show something.
//! - Rendering is deterministic: the same event always yields the same bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

use crate::event::COMMIT_STATUS_UPDATE;
use crate::event::Event;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type of adaptive card attachments.
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

/// Adaptive card schema URL.
pub const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

/// Adaptive card schema version emitted.
pub const ADAPTIVE_CARD_VERSION: &str = "1.2";

/// Subject used when the event has no involved object.
const GENERIC_SUBJECT: &str = "event";

/// Severity label used when the event severity is empty.
const UNKNOWN_SEVERITY: &str = "unknown";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Payload rendering branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Markdown message.
    Message,
    /// Adaptive card for `commit_status=update` events.
    CommitStatusUpdate,
}

impl Rendering {
    /// Selects the rendering for an event.
    ///
    /// Only an exact `update` value selects the card; everything else,
    /// including a missing key, falls back to the markdown message.
    #[must_use]
    pub fn for_event(event: &Event) -> Self {
        match event.commit_status() {
            Some(COMMIT_STATUS_UPDATE) => Self::CommitStatusUpdate,
            Some(_) | None => Self::Message,
        }
    }

    /// Returns a stable label for telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::CommitStatusUpdate => "commit_status_update",
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// JSON body accepted by the Webex messages API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebexPayload {
    /// Destination room.
    pub room_id: String,
    /// Plain-text fallback.
    pub text: String,
    /// Markdown body (message rendering only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Card attachments (update rendering only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<CardAttachment>,
}

/// Attachment wrapper around an adaptive card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttachment {
    /// Always [`ADAPTIVE_CARD_CONTENT_TYPE`].
    pub content_type: String,
    /// Card body.
    pub content: AdaptiveCard,
}

/// Minimal adaptive card document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveCard {
    /// Always `AdaptiveCard`.
    #[serde(rename = "type")]
    pub card_type: String,
    /// Schema version.
    pub version: String,
    /// Schema URL.
    #[serde(rename = "$schema")]
    pub schema: String,
    /// Card elements in display order.
    pub body: Vec<CardElement>,
}

/// Adaptive card body element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardElement {
    /// Text block.
    TextBlock {
        /// Displayed text.
        text: String,
        /// Whether the text wraps.
        wrap: bool,
        /// Optional font weight.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<String>,
        /// Optional font size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<String>,
    },
    /// Key/value fact list.
    FactSet {
        /// Facts in display order.
        facts: Vec<CardFact>,
    },
}

/// Single key/value fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFact {
    /// Fact label.
    pub title: String,
    /// Fact value.
    pub value: String,
}

// ============================================================================
// SECTION: Rendering Implementation
// ============================================================================

impl WebexPayload {
    /// Renders the payload for `event` addressed to `room_id`.
    #[must_use]
    pub fn render(room_id: &str, event: &Event, rendering: Rendering) -> Self {
        let subject = subject(event);
        let text = plain_text(event, &subject);
        match rendering {
            Rendering::Message => Self {
                room_id: room_id.to_string(),
                text,
                markdown: Some(markdown(event, &subject)),
                attachments: Vec::new(),
            },
            Rendering::CommitStatusUpdate => Self {
                room_id: room_id.to_string(),
                text,
                markdown: None,
                attachments: vec![CardAttachment {
                    content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
                    content: update_card(event, &subject),
                }],
            },
        }
    }

    /// Serializes the payload to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Builds the `kind/name/namespace` subject line.
fn subject(event: &Event) -> String {
    event.involved_object.as_ref().map_or_else(
        || GENERIC_SUBJECT.to_string(),
        |object| {
            format!("{}/{}/{}", object.kind.to_lowercase(), object.name, object.namespace)
        },
    )
}

/// Builds the plain-text fallback.
fn plain_text(event: &Event, subject: &str) -> String {
    let severity =
        if event.severity.is_empty() { UNKNOWN_SEVERITY } else { event.severity.as_str() };
    format!("[{severity}] {subject}: {}", event.message)
}

/// Builds the markdown message body.
fn markdown(event: &Event, subject: &str) -> String {
    let mut out = String::new();
    let emoji = event.severity_level().emoji();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{emoji} **{subject}**");
    let _ = writeln!(out, "{}", event.message);
    for (key, value) in &event.metadata {
        let _ = writeln!(out, ">**{key}**: {value}");
    }
    out
}

/// Builds the adaptive card for commit status updates.
fn update_card(event: &Event, subject: &str) -> AdaptiveCard {
    let emoji = event.severity_level().emoji();
    let mut body = vec![
        CardElement::TextBlock {
            text: format!("{emoji} {subject}"),
            wrap: true,
            weight: Some("Bolder".to_string()),
            size: Some("Medium".to_string()),
        },
        CardElement::TextBlock {
            text: event.message.clone(),
            wrap: true,
            weight: None,
            size: None,
        },
    ];
    if !event.metadata.is_empty() {
        body.push(CardElement::FactSet {
            facts: event
                .metadata
                .iter()
                .map(|(title, value)| CardFact {
                    title: title.clone(),
                    value: value.clone(),
                })
                .collect(),
        });
    }
    AdaptiveCard {
        card_type: "AdaptiveCard".to_string(),
        version: ADAPTIVE_CARD_VERSION.to_string(),
        schema: ADAPTIVE_CARD_SCHEMA.to_string(),
        body,
    }
}
