//! Entry status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Progress status of a course entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// The user is taking the course.
    InProgress,

    /// Access suspended, e.g. the granting membership lapsed.
    Paused,

    /// Access revoked because the originating order was cancelled or refunded.
    /// A later re-fulfilment of the same order reinstates it.
    Cancelled,

    /// The user finished the course. Terminal.
    Completed,
}

impl EntryStatus {
    /// Returns true if this entry currently grants course access.
    pub fn grants_access(&self) -> bool {
        matches!(self, EntryStatus::InProgress)
    }
}

impl StateMachine for EntryStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EntryStatus::*;
        matches!(
            (self, target),
            (InProgress, Paused)
                | (InProgress, Cancelled)
                | (InProgress, Completed)
                | (Paused, InProgress)
                | (Paused, Cancelled)
                | (Cancelled, InProgress)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EntryStatus::*;
        match self {
            InProgress => vec![Paused, Cancelled, Completed],
            Paused => vec![InProgress, Cancelled],
            Cancelled => vec![InProgress],
            Completed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_can_be_paused_cancelled_or_completed() {
        let status = EntryStatus::InProgress;
        assert!(status.can_transition_to(&EntryStatus::Paused));
        assert!(status.can_transition_to(&EntryStatus::Cancelled));
        assert!(status.can_transition_to(&EntryStatus::Completed));
    }

    #[test]
    fn paused_can_resume() {
        assert_eq!(
            EntryStatus::Paused.transition_to(EntryStatus::InProgress),
            Ok(EntryStatus::InProgress)
        );
    }

    #[test]
    fn cancelled_can_be_reinstated() {
        assert_eq!(
            EntryStatus::Cancelled.transition_to(EntryStatus::InProgress),
            Ok(EntryStatus::InProgress)
        );
    }

    #[test]
    fn cancelled_cannot_be_paused() {
        assert!(EntryStatus::Cancelled
            .transition_to(EntryStatus::Paused)
            .is_err());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(EntryStatus::Completed.is_terminal());
        assert!(EntryStatus::Completed
            .transition_to(EntryStatus::Cancelled)
            .is_err());
    }

    #[test]
    fn only_in_progress_grants_access() {
        assert!(EntryStatus::InProgress.grants_access());
        assert!(!EntryStatus::Paused.grants_access());
        assert!(!EntryStatus::Cancelled.grants_access());
        assert!(!EntryStatus::Completed.grants_access());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            EntryStatus::InProgress,
            EntryStatus::Paused,
            EntryStatus::Cancelled,
            EntryStatus::Completed,
        ] {
            for target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&EntryStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
