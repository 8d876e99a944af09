// crates/webhook-notifier/src/context.rs
// ============================================================================
// Module: Delivery Context
// Description: Caller-supplied cancellation and deadline for deliveries.
// Purpose: Abort in-flight webhook requests promptly on caller request.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! A [`DeliveryContext`] bounds a single `deliver` call. It may carry a
//! deadline, a cancellation signal, or both. [`DeliveryContext::background`]
//! carries neither.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::pending;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio::time::sleep_until;

use crate::error::TransportError;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Cancellation scope for a delivery.
#[derive(Debug, Clone, Default)]
pub struct DeliveryContext {
    /// Absolute deadline, if any.
    deadline: Option<Instant>,
    /// Cancellation signal, if any.
    cancel: Option<watch::Receiver<bool>>,
}

impl DeliveryContext {
    /// Context with no deadline and no cancellation.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a cancellable copy of this context and the handle that cancels it.
    #[must_use]
    pub fn cancellable(self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let context = Self {
            deadline: self.deadline,
            cancel: Some(receiver),
        };
        (context, CancelHandle {
            sender,
        })
    }

    /// Sets an absolute deadline, keeping the earlier one if already set.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    /// Sets a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Configured deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the context has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|receiver| *receiver.borrow())
    }

    /// Returns the error for an already finished context, if any.
    #[must_use]
    pub fn err(&self) -> Option<TransportError> {
        if self.is_cancelled() {
            return Some(TransportError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(TransportError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> TransportError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };
        let cancelled = async {
            if let Some(receiver) = &self.cancel {
                let mut receiver = receiver.clone();
                let signalled = receiver.wait_for(|cancelled| *cancelled).await.is_ok();
                if signalled {
                    return;
                }
            }
            // Sender dropped without cancelling: nothing can cancel us anymore.
            pending::<()>().await;
        };
        tokio::select! {
            biased;
            () = cancelled => TransportError::Cancelled,
            () = deadline => TransportError::DeadlineExceeded,
        }
    }
}

// ============================================================================
// SECTION: Cancel Handle
// ============================================================================

/// Cancels every delivery sharing the paired context.
#[derive(Debug)]
pub struct CancelHandle {
    /// Signal sender.
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels the context. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}
