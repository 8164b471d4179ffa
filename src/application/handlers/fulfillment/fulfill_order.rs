//! FulfillOrderHandler - Grants what a ready (or partly free) order unlocks.
//!
//! ## Course precedence
//!
//! 1. The user already has the course in progress: nothing to do
//! 2. The order created an entry earlier: put it back in progress
//! 3. Otherwise: create a new entry tied to the order
//!
//! Running the handler twice for the same order leaves the same state as
//! running it once.

use std::collections::HashMap;
use std::sync::Arc;

use super::report::{ObjectOutcome, ReconciliationError, ReconciliationReport};
use crate::domain::catalog::DomainObject;
use crate::domain::enrollment::Entry;
use crate::domain::foundation::{CourseId, MembershipId, Timestamp};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CatalogResolver, EntryFilter, EntryRepository, MembershipService, StoreError};

/// Command to fulfil an order.
#[derive(Debug, Clone)]
pub struct FulfillOrderCommand {
    pub order: Order,

    /// Order status before the change being handled. `None` when unknown or
    /// when fulfilling free items at checkout.
    pub previous_status: Option<OrderStatus>,

    /// When the host observed the change. Dates new entries and memberships.
    pub occurred_at: Timestamp,
}

/// The user's entries split the way fulfilment needs them.
///
/// An in-progress entry lands in `active` whatever its origin. Other entries
/// created by this order land in `from_order`.
#[derive(Debug, Default)]
struct UserEntries {
    active: HashMap<CourseId, Entry>,
    from_order: HashMap<CourseId, Entry>,
}

impl UserEntries {
    fn split(entries: Vec<Entry>, order: &Order) -> Self {
        let mut split = Self::default();
        for entry in entries {
            if entry.is_in_progress() {
                split.active.insert(entry.course_id, entry);
            } else if entry.originated_from(order.id) {
                split.from_order.insert(entry.course_id, entry);
            }
        }
        split
    }
}

/// Handler that creates or reinstates entries and sets up memberships.
pub struct FulfillOrderHandler {
    catalog: Arc<dyn CatalogResolver>,
    entries: Arc<dyn EntryRepository>,
    memberships: Arc<dyn MembershipService>,
}

impl FulfillOrderHandler {
    pub fn new(
        catalog: Arc<dyn CatalogResolver>,
        entries: Arc<dyn EntryRepository>,
        memberships: Arc<dyn MembershipService>,
    ) -> Self {
        Self {
            catalog,
            entries,
            memberships,
        }
    }

    pub async fn handle(
        &self,
        cmd: FulfillOrderCommand,
    ) -> Result<ReconciliationReport, ReconciliationError> {
        let order = &cmd.order;
        let mut report = ReconciliationReport::new(order.id);

        // 1. Products that may unlock something now
        let product_ids = order.fulfillable_product_ids();
        if product_ids.is_empty() {
            tracing::debug!(order_id = %order.id, status = %order.status, "Nothing to fulfil");
            return Ok(report);
        }

        // 2. Linked objects
        let objects = self.catalog.resolve(&product_ids).await?;
        if objects.is_empty() {
            tracing::debug!(order_id = %order.id, "Order products unlock nothing");
            return Ok(report);
        }

        // 3. Grant each object independently
        let mut user_entries: Option<UserEntries> = None;
        for object in objects {
            match object {
                DomainObject::Course(course_id) => {
                    if user_entries.is_none() {
                        match self.entries.find(EntryFilter::for_user(order.user_id)).await {
                            Ok(found) => user_entries = Some(UserEntries::split(found, order)),
                            Err(e) => {
                                tracing::warn!(
                                    order_id = %order.id,
                                    course_id = %course_id,
                                    error = %e,
                                    "Could not load user entries"
                                );
                                report.fail(object, e);
                                continue;
                            }
                        }
                    }
                    if let Some(known) = user_entries.as_mut() {
                        self.grant_course(&cmd, course_id, known, &mut report).await;
                    }
                }
                DomainObject::Membership(membership_id) => {
                    self.grant_membership(&cmd, membership_id, &mut report).await;
                }
            }
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            applied = report.outcomes.len(),
            failed = report.failures.len(),
            "Order fulfilled"
        );
        report.into_result()
    }

    async fn grant_course(
        &self,
        cmd: &FulfillOrderCommand,
        course_id: CourseId,
        known: &mut UserEntries,
        report: &mut ReconciliationReport,
    ) {
        let order = &cmd.order;
        let object = DomainObject::Course(course_id);

        if known.active.contains_key(&course_id) {
            tracing::debug!(
                order_id = %order.id,
                course_id = %course_id,
                "Course already in progress"
            );
            report.record(ObjectOutcome::AlreadyInProgress { course_id });
            return;
        }

        if let Some(mut entry) = known.from_order.get(&course_id).cloned() {
            if let Err(e) = entry.resume() {
                tracing::warn!(
                    order_id = %order.id,
                    course_id = %course_id,
                    entry_id = %entry.id,
                    error = %e,
                    "Order entry cannot be reinstated"
                );
                report.record(ObjectOutcome::Skipped {
                    object,
                    reason: e.to_string(),
                });
                return;
            }
            match self.entries.save(&entry).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = %order.id,
                        course_id = %course_id,
                        entry_id = %entry.id,
                        "Entry reinstated"
                    );
                    report.record(ObjectOutcome::EntryReinstated {
                        course_id,
                        entry_id: entry.id,
                    });
                    known.from_order.remove(&course_id);
                    known.active.insert(course_id, entry);
                }
                Err(e) => record_grant_failure(order, object, e, report),
            }
            return;
        }

        let entry = Entry::from_order(course_id, order.user_id, order.id, cmd.occurred_at);
        match self.entries.save(&entry).await {
            Ok(()) => {
                tracing::info!(
                    order_id = %order.id,
                    course_id = %course_id,
                    entry_id = %entry.id,
                    "Entry created"
                );
                report.record(ObjectOutcome::EntryCreated {
                    course_id,
                    entry_id: entry.id,
                });
                known.active.insert(course_id, entry);
            }
            Err(e) => record_grant_failure(order, object, e, report),
        }
    }

    async fn grant_membership(
        &self,
        cmd: &FulfillOrderCommand,
        membership_id: MembershipId,
        report: &mut ReconciliationReport,
    ) {
        let order = &cmd.order;

        // Setup already happened when the order first became ready.
        if cmd.previous_status.is_some_and(|s| s.is_ready()) {
            tracing::debug!(
                order_id = %order.id,
                membership_id = %membership_id,
                "Membership already set up"
            );
            report.record(ObjectOutcome::MembershipSetupSkipped { membership_id });
            return;
        }

        match self
            .memberships
            .setup_membership(order.user_id, membership_id, cmd.occurred_at)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    membership_id = %membership_id,
                    "Membership set up"
                );
                report.record(ObjectOutcome::MembershipSetUp { membership_id });
            }
            Err(StoreError::NotFound { .. }) => {
                tracing::warn!(
                    order_id = %order.id,
                    membership_id = %membership_id,
                    "Membership plan metadata missing"
                );
                report.record(ObjectOutcome::Skipped {
                    object: DomainObject::Membership(membership_id),
                    reason: "membership plan metadata missing".to_string(),
                });
            }
            Err(e) => record_grant_failure(
                order,
                DomainObject::Membership(membership_id),
                e,
                report,
            ),
        }
    }
}

fn record_grant_failure(
    order: &Order,
    object: DomainObject,
    error: StoreError,
    report: &mut ReconciliationReport,
) {
    tracing::warn!(order_id = %order.id, object = %object, error = %error, "Grant failed");
    report.fail(object, error);
}
