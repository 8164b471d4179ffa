//! Course entry aggregate.
//!
//! An entry is one attempt by a user to take one course. Entries are never
//! deleted by reconciliation; they move between statuses instead.

use serde::{Deserialize, Serialize};

use super::{EntryOrigin, EntryStatus};
use crate::domain::foundation::{
    CourseId, DomainError, EntryId, OrderId, StateMachine, Timestamp, UserId,
};

/// Course entry aggregate.
///
/// # Invariants
///
/// - `payment_id` is set for `CommerceOrder` entries and names the order
///   that granted access
/// - Status changes follow the `EntryStatus` state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub entry_origin: EntryOrigin,
    pub payment_id: Option<OrderId>,
    pub entry_status: EntryStatus,
    pub entry_date: Timestamp,
}

impl Entry {
    /// Create an in-progress entry granted by a commerce order.
    pub fn from_order(
        course_id: CourseId,
        user_id: UserId,
        order_id: OrderId,
        entry_date: Timestamp,
    ) -> Self {
        Self {
            id: EntryId::new(),
            course_id,
            user_id,
            entry_origin: EntryOrigin::CommerceOrder,
            payment_id: Some(order_id),
            entry_status: EntryStatus::InProgress,
            entry_date,
        }
    }

    /// Create an in-progress entry from any other origin.
    pub fn granted(
        course_id: CourseId,
        user_id: UserId,
        origin: EntryOrigin,
        entry_date: Timestamp,
    ) -> Self {
        Self {
            id: EntryId::new(),
            course_id,
            user_id,
            entry_origin: origin,
            payment_id: None,
            entry_status: EntryStatus::InProgress,
            entry_date,
        }
    }

    /// True if this entry was created by the given order.
    pub fn originated_from(&self, order_id: OrderId) -> bool {
        self.entry_origin == EntryOrigin::CommerceOrder && self.payment_id == Some(order_id)
    }

    pub fn is_in_progress(&self) -> bool {
        self.entry_status == EntryStatus::InProgress
    }

    /// Put the entry (back) in progress.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is completed.
    pub fn resume(&mut self) -> Result<(), DomainError> {
        self.transition_to(EntryStatus::InProgress)
    }

    /// Suspend access to the course.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is cancelled or completed.
    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.transition_to(EntryStatus::Paused)
    }

    /// Revoke access because the originating purchase was undone.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is already cancelled or completed.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(EntryStatus::Cancelled)
    }

    /// Mark the course as finished.
    ///
    /// # Errors
    ///
    /// Returns error unless the entry is in progress.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition_to(EntryStatus::Completed)
    }

    fn transition_to(&mut self, target: EntryStatus) -> Result<(), DomainError> {
        self.entry_status = self
            .entry_status
            .transition_to(target)
            .map_err(|e| e.with_detail("entry_id", self.id.to_string()))?;
        Ok(())
    }
}
