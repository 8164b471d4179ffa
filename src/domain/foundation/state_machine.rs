//! State machine trait for status enums.
//!
//! Entry and membership statuses share one interface for validating and
//! performing transitions.

use super::{DomainError, ErrorCode};

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for EntryStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (InProgress, Paused) | (Paused, InProgress))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             InProgress => vec![Paused],
///             Paused => vec![InProgress],
///         }
///     }
/// }
///
/// let next = entry.status.transition_to(EntryStatus::Paused)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {:?} to {:?}", self, target),
            )
            .with_detail("from", format!("{:?}", self))
            .with_detail("to", format!("{:?}", target)))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
