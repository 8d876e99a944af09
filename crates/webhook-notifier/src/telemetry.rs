// crates/webhook-notifier/src/telemetry.rs
// ============================================================================
// Module: Delivery Telemetry
// Description: Observer hooks and a JSON-lines log for delivery attempts.
// Purpose: Record delivery outcomes without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every delivery attempt produces one [`DeliveryRecord`] handed to a
//! [`DeliveryObserver`]. [`NoopObserver`] discards records;
//! [`JsonLineObserver`] writes one JSON object per line to any writer.
//! Security posture: records never include the token or the message body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use serde::Serialize;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Delivery outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// 2xx response.
    Ok,
    /// Transport failure or non-2xx response.
    Error,
}

/// One delivery attempt.
///
/// # Invariants
/// - `status` is `None` when no response was received.
/// - `error_kind` is `Some` exactly when `outcome` is [`DeliveryOutcome::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRecord {
    /// Endpoint host.
    pub endpoint_host: String,
    /// Destination room.
    pub channel: String,
    /// Rendering label.
    pub rendering: &'static str,
    /// Outcome.
    pub outcome: DeliveryOutcome,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Error label, when failed.
    pub error_kind: Option<&'static str>,
    /// Serialized request body size.
    pub request_bytes: usize,
    /// Wall time spent in the attempt.
    #[serde(serialize_with = "serialize_millis", rename = "latency_ms")]
    pub latency: Duration,
}

/// Serializes a duration as whole milliseconds.
fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Receives delivery records.
pub trait DeliveryObserver: Send + Sync {
    /// Records one delivery attempt.
    fn record_delivery(&self, record: DeliveryRecord);
}

/// Discards all records.
pub struct NoopObserver;

impl DeliveryObserver for NoopObserver {
    fn record_delivery(&self, _record: DeliveryRecord) {}
}

// ============================================================================
// SECTION: JSON Line Observer
// ============================================================================

/// Writes each record as a single JSON line.
///
/// # Invariants
/// - Write failures are dropped; they never affect delivery results.
/// - A writer that panicked mid-record does not silence later records.
pub struct JsonLineObserver<W> {
    /// Output sink.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineObserver<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> DeliveryObserver for JsonLineObserver<W> {
    fn record_delivery(&self, record: DeliveryRecord) {
        let Ok(mut line) = serde_json::to_vec(&record) else {
            return;
        };
        line.push(b'\n');
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if writer.write_all(&line).is_ok() {
            let _ = writer.flush();
        }
    }
}
