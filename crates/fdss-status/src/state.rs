//! # View State Machine
//!
//! ## States
//!
//! ```text
//! Idle                      (fully delivered, no fetch; terminal)
//! Loading ──► Success       (terminal for the activation)
//!        └──► Error         (terminal for the activation)
//! ```
//!
//! A new activation always starts from `Idle` or `Loading`; the previous
//! activation's outcome is discarded with it.
//!
//! A fetch outcome is first folded into a [`TrackingResult`]. Cancellation
//! becomes `Pending`, which leaves the state untouched, so a superseded or
//! torn-down fetch can never show an error.

use fdss_core::TrackingPayload;
use fdss_tracking_client::TrackingError;
use serde::Serialize;

/// Outcome of one fetch, as seen by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingResult {
    /// No outcome to apply (not started, or cancelled).
    Pending,
    Success(TrackingPayload),
    /// User-facing failure reason.
    Failure(String),
}

impl From<Result<TrackingPayload, TrackingError>> for TrackingResult {
    fn from(outcome: Result<TrackingPayload, TrackingError>) -> Self {
        match outcome {
            Ok(payload) => Self::Success(payload),
            Err(e) if e.is_cancelled() => Self::Pending,
            Err(e) => Self::Failure(e.user_message()),
        }
    }
}

/// Visible state of the status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ViewState {
    /// Order is fully delivered; nothing was fetched.
    Idle,
    /// Fetch in flight, or waiting for the host to supply an order id.
    Loading,
    Success(TrackingPayload),
    Error(String),
}

impl ViewState {
    /// Whether this state can no longer change within its activation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Fold a fetch outcome into the state.
    ///
    /// Only `Loading` moves. `Pending` never changes anything.
    pub fn apply(&mut self, result: TrackingResult) {
        if self.is_terminal() {
            tracing::debug!(state = %self, "ignoring outcome for settled view");
            return;
        }
        match result {
            TrackingResult::Pending => {}
            TrackingResult::Success(payload) => *self = Self::Success(payload),
            TrackingResult::Failure(reason) => *self = Self::Error(reason),
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Success(_) => "SUCCESS",
            Self::Error(_) => "ERROR",
        };
        f.write_str(s)
    }
}
