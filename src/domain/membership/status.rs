//! Membership status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Status of a user's membership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Membership grants access to its courses.
    Active,

    /// Temporarily suspended; membership entries are paused too.
    Paused,

    /// Ended. A new setup replaces the record.
    Expired,
}

impl MembershipStatus {
    pub fn has_access(&self) -> bool {
        matches!(self, MembershipStatus::Active)
    }
}

impl StateMachine for MembershipStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MembershipStatus::*;
        matches!(
            (self, target),
            (Active, Paused)
                | (Active, Expired)
                | (Paused, Active)
                | (Paused, Expired)
                | (Expired, Active) // Re-purchase
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MembershipStatus::*;
        match self {
            Active => vec![Paused, Expired],
            Paused => vec![Active, Expired],
            Expired => vec![Active],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_can_expire() {
        assert_eq!(
            MembershipStatus::Active.transition_to(MembershipStatus::Expired),
            Ok(MembershipStatus::Expired)
        );
    }

    #[test]
    fn paused_can_expire_or_resume() {
        assert!(MembershipStatus::Paused.can_transition_to(&MembershipStatus::Expired));
        assert!(MembershipStatus::Paused.can_transition_to(&MembershipStatus::Active));
    }

    #[test]
    fn expired_cannot_be_paused() {
        assert!(MembershipStatus::Expired
            .transition_to(MembershipStatus::Paused)
            .is_err());
    }

    #[test]
    fn expired_is_not_terminal_can_repurchase() {
        assert!(!MembershipStatus::Expired.is_terminal());
    }

    #[test]
    fn only_active_has_access() {
        assert!(MembershipStatus::Active.has_access());
        assert!(!MembershipStatus::Paused.has_access());
        assert!(!MembershipStatus::Expired.has_access());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::Paused,
            MembershipStatus::Expired,
        ] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
        }
    }
}
