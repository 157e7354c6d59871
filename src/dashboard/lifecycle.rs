//! Per-kind analysis lifecycle with generation tickets.
//!
//! ```text
//! idle ──begin──▶ loading ──finish──▶ success | error
//!   ▲                                      │
//!   └───────────────reset──────────────────┘
//! success ──begin──▶ loading
//! ```
//!
//! Every `begin` and every `reset` advances the generation. A completion
//! only lands if its ticket still matches the current generation and the
//! lifecycle is still loading.

use serde::Serialize;

use super::DashboardError;
use crate::models::{AnalysisKind, AnalysisState};

/// Proof that a caller started the current loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: AnalysisKind,
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Lifecycle {
    kind: AnalysisKind,
    state: AnalysisState,
    #[serde(skip)]
    generation: u64,
}

impl Lifecycle {
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            state: AnalysisState::Idle,
            generation: 0,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enter `loading`. Allowed from `idle` and `success` only.
    pub fn begin(&mut self) -> Result<Ticket, DashboardError> {
        match self.state {
            AnalysisState::Idle | AnalysisState::Success => {
                self.generation += 1;
                self.state = AnalysisState::Loading;
                Ok(Ticket {
                    kind: self.kind,
                    generation: self.generation,
                })
            }
            AnalysisState::Loading => Err(DashboardError::AlreadyInFlight(self.kind)),
            AnalysisState::Error => Err(DashboardError::InvalidTransition {
                kind: self.kind,
                state: self.state,
            }),
        }
    }

    /// Whether a completion holding `ticket` may still write.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.kind == self.kind
            && ticket.generation == self.generation
            && self.state == AnalysisState::Loading
    }

    /// Leave `loading` for `success` or `error`. Returns false (and changes
    /// nothing) when the ticket is stale.
    pub fn finish(&mut self, ticket: &Ticket, succeeded: bool) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = if succeeded {
            AnalysisState::Success
        } else {
            AnalysisState::Error
        };
        true
    }

    /// Back to `idle`, invalidating any outstanding ticket.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = AnalysisState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let life = Lifecycle::new(AnalysisKind::Panel);
        assert_eq!(life.state(), AnalysisState::Idle);
        assert_eq!(life.kind(), AnalysisKind::Panel);
    }

    #[test]
    fn begin_then_finish_success() {
        let mut life = Lifecycle::new(AnalysisKind::Scan);
        let ticket = life.begin().unwrap();
        assert_eq!(life.state(), AnalysisState::Loading);
        assert!(life.finish(&ticket, true));
        assert_eq!(life.state(), AnalysisState::Success);
    }

    #[test]
    fn begin_while_loading_is_rejected_without_change() {
        let mut life = Lifecycle::new(AnalysisKind::Panel);
        let ticket = life.begin().unwrap();
        let generation = life.generation();

        let err = life.begin().unwrap_err();
        assert!(matches!(err, DashboardError::AlreadyInFlight(AnalysisKind::Panel)));
        assert_eq!(life.generation(), generation);
        assert!(life.is_current(&ticket));
    }

    #[test]
    fn resubmission_allowed_from_success() {
        let mut life = Lifecycle::new(AnalysisKind::Panel);
        let first = life.begin().unwrap();
        life.finish(&first, true);
        let second = life.begin().unwrap();
        assert_ne!(first, second);
        assert!(!life.is_current(&first));
    }

    #[test]
    fn error_requires_reset_before_retry() {
        let mut life = Lifecycle::new(AnalysisKind::Insights);
        let ticket = life.begin().unwrap();
        life.finish(&ticket, false);
        assert_eq!(life.state(), AnalysisState::Error);
        assert!(matches!(
            life.begin(),
            Err(DashboardError::InvalidTransition { .. })
        ));

        life.reset();
        assert!(life.begin().is_ok());
    }

    #[test]
    fn reset_invalidates_outstanding_ticket() {
        let mut life = Lifecycle::new(AnalysisKind::Scan);
        let ticket = life.begin().unwrap();
        life.reset();
        assert!(!life.finish(&ticket, true));
        assert_eq!(life.state(), AnalysisState::Idle);
    }

    #[test]
    fn reset_then_new_begin_still_rejects_old_ticket() {
        let mut life = Lifecycle::new(AnalysisKind::Scan);
        let old = life.begin().unwrap();
        life.reset();
        let new = life.begin().unwrap();
        assert!(!life.finish(&old, true));
        assert_eq!(life.state(), AnalysisState::Loading);
        assert!(life.finish(&new, true));
    }

    #[test]
    fn ticket_of_another_kind_is_not_current() {
        let mut panel = Lifecycle::new(AnalysisKind::Panel);
        let mut scan = Lifecycle::new(AnalysisKind::Scan);
        let panel_ticket = panel.begin().unwrap();
        scan.begin().unwrap();
        assert!(!scan.is_current(&panel_ticket));
    }
}
