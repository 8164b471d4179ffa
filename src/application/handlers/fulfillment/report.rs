//! Reconciliation outcomes and errors.
//!
//! Every linked object in an order is reconciled independently. The report
//! records what happened to each one; a store failure on one object never
//! undoes work already applied to another.

use thiserror::Error;

use crate::domain::catalog::DomainObject;
use crate::domain::foundation::{CourseId, EntryId, MembershipId, OrderId};
use crate::domain::membership::Retraction;
use crate::ports::StoreError;

/// What reconciliation did for one linked object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// A new in-progress entry was created for the order.
    EntryCreated { course_id: CourseId, entry_id: EntryId },

    /// The order's existing entry was put back in progress.
    EntryReinstated { course_id: CourseId, entry_id: EntryId },

    /// The user already has an in-progress entry for the course.
    AlreadyInProgress { course_id: CourseId },

    /// The order's entry was cancelled.
    EntryCancelled { course_id: CourseId, entry_id: EntryId },

    /// The order's entry was cancelled by an earlier delivery.
    AlreadyCancelled { course_id: CourseId, entry_id: EntryId },

    /// The order never created an entry for the course.
    NoOrderEntry { course_id: CourseId },

    /// Membership setup was requested.
    MembershipSetUp { membership_id: MembershipId },

    /// The order was already ready before; setup happened then.
    MembershipSetupSkipped { membership_id: MembershipId },

    /// The user's membership lost the cancelled term.
    MembershipRetracted {
        membership_id: MembershipId,
        retraction: Retraction,
    },

    /// The user does not currently hold this plan.
    MembershipNotHeld { membership_id: MembershipId },

    /// The object could not be reconciled and was left untouched.
    Skipped { object: DomainObject, reason: String },
}

/// A store failure while reconciling one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFailure {
    pub object: DomainObject,
    pub error: StoreError,
}

/// Per-object record of one reconciliation pass over an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub order_id: OrderId,
    pub outcomes: Vec<ObjectOutcome>,
    pub failures: Vec<ObjectFailure>,
}

impl ReconciliationReport {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ObjectOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn fail(&mut self, object: DomainObject, error: StoreError) {
        self.failures.push(ObjectFailure { object, error });
    }

    /// True if the pass neither changed nor attempted anything.
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty() && self.failures.is_empty()
    }

    /// Entries created during this pass.
    pub fn created_entries(&self) -> Vec<CourseId> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ObjectOutcome::EntryCreated { course_id, .. } => Some(*course_id),
                _ => None,
            })
            .collect()
    }

    /// `Err(PartiallyApplied)` if any object failed, otherwise the report.
    pub fn into_result(self) -> Result<Self, ReconciliationError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(ReconciliationError::PartiallyApplied(self))
        }
    }
}

/// Errors returned to the host.
///
/// Whether a retry can help depends on the underlying `StoreError`; see
/// [`StoreError::is_retryable`] and [`ReconciliationError::is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// Nothing was applied: the order or its links could not be read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Some objects were reconciled, others failed.
    #[error(
        "order {} partially reconciled: {} object(s) failed",
        .0.order_id,
        .0.failures.len()
    )]
    PartiallyApplied(ReconciliationReport),
}

impl ReconciliationError {
    /// True if redelivering the event may succeed.
    ///
    /// A partial pass is retryable when any of its failures is.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconciliationError::Store(e) => e.is_retryable(),
            ReconciliationError::PartiallyApplied(report) => {
                report.failures.iter().any(|f| f.error.is_retryable())
            }
        }
    }

    /// The partial report, if any work was applied.
    pub fn report(&self) -> Option<&ReconciliationReport> {
        match self {
            ReconciliationError::PartiallyApplied(report) => Some(report),
            ReconciliationError::Store(_) => None,
        }
    }
}
