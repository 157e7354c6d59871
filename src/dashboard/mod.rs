//! Session state store for one dashboard session.
//!
//! Holds the current blood panel, scan upload and result, combined
//! insights, cached explanation and chat transcript, plus one lifecycle per
//! analysis kind. Every mutation is broadcast to subscribers.

pub mod events;
pub mod lifecycle;
pub mod store;

pub use events::*;
pub use lifecycle::*;
pub use store::*;

use thiserror::Error;

use crate::advisor::AdvisorError;
use crate::models::{AnalysisKind, AnalysisState};

/// Why a dashboard operation did not run, or how it failed.
///
/// Every variant except `Advisor` and `ScanFailed` is a rejection: the
/// session is left exactly as it was. Those two have already been recorded
/// in the session (error lifecycle, notice) by the time they are returned.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("A {0} analysis is already in progress")]
    AlreadyInFlight(AnalysisKind),

    #[error("Cannot start {kind} analysis from the {state} state")]
    InvalidTransition {
        kind: AnalysisKind,
        state: AnalysisState,
    },

    #[error("Insights need both analyses complete (panel: {panel}, scan: {scan})")]
    InsightsNotReady {
        panel: AnalysisState,
        scan: AnalysisState,
    },

    #[error("No blood panel has been analyzed")]
    PanelNotReady,

    #[error("No scan has been uploaded")]
    NoScanUploaded,

    #[error("Unsupported scan file {0}: expected a PNG or JPEG image")]
    UnsupportedScanFormat(String),

    #[error("An explanation is already being generated")]
    ExplanationInFlight,

    #[error("A chat reply is already pending")]
    ChatInFlight,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Scan classification failed: {0}")]
    ScanFailed(String),

    #[error("Internal lock error")]
    LockPoisoned,

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

/// Outcome of an asynchronous step that passed its admission checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    /// The result was written to the session.
    Committed(T),
    /// The session was reset or resubmitted while the step was running;
    /// the result was dropped.
    Discarded,
}

impl<T> Completion<T> {
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(value) => Some(value),
            Self::Discarded => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}
