//! States of a single dispatch.

use chrono::{DateTime, Utc};

/// Lifecycle of one dispatched transaction.
///
/// Synchronous dispatch goes `Built -> Confirmed` through one blocking
/// submit-and-confirm call. Asynchronous dispatch goes
/// `Built -> Submitted -> Pending -> ... -> Confirmed`, or ends in
/// `Exhausted` once the polling cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Signed, not yet handed to the endpoint.
    Built,
    /// Accepted by the endpoint at `sent_at`.
    Submitted { sent_at: DateTime<Utc> },
    /// Waiting for a receipt; `attempts` receipt queries have been made.
    Pending {
        sent_at: DateTime<Utc>,
        attempts: u32,
    },
    /// Receipt observed.
    Confirmed {
        sent_at: DateTime<Utc>,
        block_number: u64,
        confirmed_at: DateTime<Utc>,
    },
    /// Polling cap reached without a receipt.
    Exhausted { attempts: u32 },
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::Confirmed { .. } | DispatchState::Exhausted { .. }
        )
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchState::Built => "built",
            DispatchState::Submitted { .. } => "submitted",
            DispatchState::Pending { .. } => "pending",
            DispatchState::Confirmed { .. } => "confirmed",
            DispatchState::Exhausted { .. } => "exhausted",
        }
    }
}
