//! RevokeOrderHandler - Takes back what a cancelled or refunded order granted.
//!
//! Only charged products are revoked; free items stay with the customer.
//! Only entries the order itself created are cancelled, so access the user
//! holds through another origin survives.

use chrono::FixedOffset;
use std::sync::Arc;

use super::report::{ObjectOutcome, ReconciliationError, ReconciliationReport};
use crate::domain::catalog::DomainObject;
use crate::domain::enrollment::{Entry, EntryStatus};
use crate::domain::foundation::{CourseId, MembershipId, Timestamp};
use crate::domain::order::Order;
use crate::ports::{
    CatalogResolver, EntryFilter, EntryRepository, MembershipRepository, MembershipService,
    StoreError,
};

/// Command to revoke an order.
#[derive(Debug, Clone)]
pub struct RevokeOrderCommand {
    pub order: Order,

    /// When the host observed the cancellation. Its calendar day is "today"
    /// for expiration checks.
    pub occurred_at: Timestamp,
}

/// Handler that cancels order entries and retracts membership terms.
pub struct RevokeOrderHandler {
    catalog: Arc<dyn CatalogResolver>,
    entries: Arc<dyn EntryRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    membership_service: Arc<dyn MembershipService>,
    calendar_offset: FixedOffset,
}

impl RevokeOrderHandler {
    pub fn new(
        catalog: Arc<dyn CatalogResolver>,
        entries: Arc<dyn EntryRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        membership_service: Arc<dyn MembershipService>,
        calendar_offset: FixedOffset,
    ) -> Self {
        Self {
            catalog,
            entries,
            membership_repo,
            membership_service,
            calendar_offset,
        }
    }

    pub async fn handle(
        &self,
        cmd: RevokeOrderCommand,
    ) -> Result<ReconciliationReport, ReconciliationError> {
        let order = &cmd.order;
        let mut report = ReconciliationReport::new(order.id);

        // 1. Charged products only
        let product_ids = order.charged_product_ids();
        if product_ids.is_empty() {
            tracing::debug!(order_id = %order.id, "No charged products to revoke");
            return Ok(report);
        }

        // 2. Linked objects
        let objects = self.catalog.resolve(&product_ids).await?;
        if objects.is_empty() {
            tracing::debug!(order_id = %order.id, "Order products unlock nothing");
            return Ok(report);
        }

        // 3. Revoke each object independently
        let mut order_entries: Option<Vec<Entry>> = None;
        for object in objects {
            match object {
                DomainObject::Course(course_id) => {
                    if order_entries.is_none() {
                        let filter = EntryFilter::for_order(order.user_id, order.id);
                        match self.entries.find(filter).await {
                            Ok(found) => order_entries = Some(found),
                            Err(e) => {
                                tracing::warn!(
                                    order_id = %order.id,
                                    course_id = %course_id,
                                    error = %e,
                                    "Could not load order entries"
                                );
                                report.fail(object, e);
                                continue;
                            }
                        }
                    }
                    if let Some(found) = order_entries.as_deref() {
                        self.cancel_course(order, course_id, found, &mut report).await;
                    }
                }
                DomainObject::Membership(membership_id) => {
                    self.retract_membership(&cmd, membership_id, &mut report).await;
                }
            }
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            applied = report.outcomes.len(),
            failed = report.failures.len(),
            "Order revoked"
        );
        report.into_result()
    }

    async fn cancel_course(
        &self,
        order: &Order,
        course_id: CourseId,
        order_entries: &[Entry],
        report: &mut ReconciliationReport,
    ) {
        let object = DomainObject::Course(course_id);
        let matching: Vec<&Entry> = order_entries
            .iter()
            .filter(|e| e.course_id == course_id)
            .collect();

        if matching.is_empty() {
            tracing::debug!(order_id = %order.id, course_id = %course_id, "Order created no entry");
            report.record(ObjectOutcome::NoOrderEntry { course_id });
            return;
        }

        for entry in matching {
            if entry.entry_status == EntryStatus::Cancelled {
                report.record(ObjectOutcome::AlreadyCancelled {
                    course_id,
                    entry_id: entry.id,
                });
                continue;
            }

            let mut cancelled = entry.clone();
            if let Err(e) = cancelled.cancel() {
                tracing::warn!(
                    order_id = %order.id,
                    course_id = %course_id,
                    entry_id = %entry.id,
                    error = %e,
                    "Order entry cannot be cancelled"
                );
                report.record(ObjectOutcome::Skipped {
                    object,
                    reason: e.to_string(),
                });
                continue;
            }

            match self.entries.save(&cancelled).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = %order.id,
                        course_id = %course_id,
                        entry_id = %entry.id,
                        "Entry cancelled"
                    );
                    report.record(ObjectOutcome::EntryCancelled {
                        course_id,
                        entry_id: entry.id,
                    });
                }
                Err(e) => record_revoke_failure(order, object, e, report),
            }
        }
    }

    async fn retract_membership(
        &self,
        cmd: &RevokeOrderCommand,
        membership_id: MembershipId,
        report: &mut ReconciliationReport,
    ) {
        let order = &cmd.order;
        let object = DomainObject::Membership(membership_id);

        let current = match self.membership_repo.find_by_user(order.user_id).await {
            Ok(current) => current,
            Err(e) => return record_revoke_failure(order, object, e, report),
        };

        let Some(mut membership) = current.filter(|m| m.is_for(membership_id)) else {
            tracing::debug!(
                order_id = %order.id,
                user_id = %order.user_id,
                membership_id = %membership_id,
                "User does not hold this membership"
            );
            report.record(ObjectOutcome::MembershipNotHeld { membership_id });
            return;
        };

        let retracted = if membership.expiration.is_none() {
            membership.expire_onetime()
        } else {
            let meta = match self.membership_service.membership_meta(membership_id).await {
                Ok(Some(meta)) => meta,
                Ok(None) => {
                    tracing::warn!(
                        order_id = %order.id,
                        membership_id = %membership_id,
                        "Membership plan metadata missing"
                    );
                    report.record(ObjectOutcome::Skipped {
                        object,
                        reason: "membership plan metadata missing".to_string(),
                    });
                    return;
                }
                Err(e) => return record_revoke_failure(order, object, e, report),
            };
            membership.retract_term(&meta, cmd.occurred_at, self.calendar_offset)
        };

        let retraction = match retracted {
            Ok(retraction) => retraction,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    membership_id = %membership_id,
                    error = %e,
                    "Membership term cannot be retracted"
                );
                report.record(ObjectOutcome::Skipped {
                    object,
                    reason: e.to_string(),
                });
                return;
            }
        };

        if let Err(e) = self.membership_repo.update(&membership).await {
            return record_revoke_failure(order, object, e, report);
        }
        if let Err(e) = self
            .membership_service
            .update_membership_entries(order.user_id, EntryStatus::Paused)
            .await
        {
            return record_revoke_failure(order, object, e, report);
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            membership_id = %membership_id,
            retraction = ?retraction,
            "Membership retracted"
        );
        report.record(ObjectOutcome::MembershipRetracted {
            membership_id,
            retraction,
        });
    }
}

fn record_revoke_failure(
    order: &Order,
    object: DomainObject,
    error: StoreError,
    report: &mut ReconciliationReport,
) {
    tracing::warn!(order_id = %order.id, object = %object, error = %error, "Revoke failed");
    report.fail(object, error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCatalog, InMemoryEntryRepository, InMemoryMembershipRepository,
        InMemoryMembershipService,
    };
    use crate::domain::catalog::CatalogLink;
    use crate::domain::enrollment::EntryOrigin;
    use crate::domain::foundation::{OrderId, ProductId, UserId};
    use crate::domain::membership::{
        MembershipMeta, MembershipStatus, Period, Retraction, UserMembership,
    };
    use crate::domain::order::{LineItem, OrderStatus};
    use chrono::{TimeZone, Utc};

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    const FREE_PRODUCT: u64 = 1;
    const PAID_PRODUCT: u64 = 2;
    const PLAN_PRODUCT: u64 = 3;

    fn pid(id: u64) -> ProductId {
        ProductId::new(id).unwrap()
    }

    fn course(id: u64) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn plan() -> MembershipId {
        MembershipId::new(40).unwrap()
    }

    fn user() -> UserId {
        UserId::new(7).unwrap()
    }

    fn order_id() -> OrderId {
        OrderId::new(100).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn monthly() -> MembershipMeta {
        MembershipMeta::new(1500, 1, Period::Month)
    }

    fn command(occurred_at: Timestamp) -> RevokeOrderCommand {
        RevokeOrderCommand {
            order: Order::new(
                order_id(),
                user(),
                OrderStatus::Cancelled,
                vec![
                    LineItem::new(pid(FREE_PRODUCT), 0),
                    LineItem::new(pid(PAID_PRODUCT), 4900),
                    LineItem::new(pid(PLAN_PRODUCT), 1500),
                ],
            ),
            occurred_at,
        }
    }

    struct Fixture {
        entries: Arc<InMemoryEntryRepository>,
        memberships: Arc<InMemoryMembershipRepository>,
        handler: RevokeOrderHandler,
    }

    async fn fixture(existing: Option<UserMembership>, meta: Option<MembershipMeta>) -> Fixture {
        let catalog = Arc::new(InMemoryCatalog::with_links(vec![
            CatalogLink::published(pid(FREE_PRODUCT), DomainObject::Course(course(10))),
            CatalogLink::published(pid(PAID_PRODUCT), DomainObject::Course(course(20))),
            CatalogLink::published(pid(PLAN_PRODUCT), DomainObject::Membership(plan())),
        ]));
        let entries = Arc::new(InMemoryEntryRepository::new());
        let memberships = Arc::new(InMemoryMembershipRepository::with_memberships(
            existing.into_iter().collect(),
        ));
        let service = Arc::new(InMemoryMembershipService::new(
            memberships.clone(),
            entries.clone(),
        ));
        if let Some(meta) = meta {
            service.define_plan(plan(), meta).await;
        }
        let handler = RevokeOrderHandler::new(
            catalog,
            entries.clone(),
            memberships.clone(),
            service,
            FixedOffset::east_opt(0).unwrap(),
        );
        Fixture {
            entries,
            memberships,
            handler,
        }
    }

    fn held(starts_at: Timestamp, meta: &MembershipMeta) -> UserMembership {
        UserMembership::activate(user(), plan(), meta, starts_at).unwrap()
    }

    async fn current(f: &Fixture) -> UserMembership {
        f.memberships.find_by_user(user()).await.unwrap().unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn cancels_only_paid_entries_created_by_the_order() {
        let f = fixture(None, Some(monthly())).await;
        let free = Entry::from_order(course(10), user(), order_id(), at(2024, 1, 1));
        let paid = Entry::from_order(course(20), user(), order_id(), at(2024, 1, 1));
        let manual = Entry::granted(course(20), user(), EntryOrigin::Manual, at(2024, 1, 1));
        for e in [&free, &paid, &manual] {
            f.entries.save(e).await.unwrap();
        }

        let report = f.handler.handle(command(at(2024, 1, 5))).await.unwrap();

        assert!(report.outcomes.contains(&ObjectOutcome::EntryCancelled {
            course_id: course(20),
            entry_id: paid.id,
        }));
        let all = f.entries.all().await;
        assert_eq!(all[0].entry_status, EntryStatus::InProgress);
        assert_eq!(all[1].entry_status, EntryStatus::Cancelled);
        assert_eq!(all[2].entry_status, EntryStatus::InProgress);
    }

    #[tokio::test]
    async fn redelivered_cancellation_leaves_entries_cancelled() {
        let f = fixture(None, Some(monthly())).await;
        let paid = Entry::from_order(course(20), user(), order_id(), at(2024, 1, 1));
        f.entries.save(&paid).await.unwrap();

        f.handler.handle(command(at(2024, 1, 5))).await.unwrap();
        let report = f.handler.handle(command(at(2024, 1, 5))).await.unwrap();

        assert!(report.outcomes.contains(&ObjectOutcome::AlreadyCancelled {
            course_id: course(20),
            entry_id: paid.id,
        }));
        assert_eq!(f.entries.all().await.len(), 1);
    }

    #[tokio::test]
    async fn course_without_order_entry_is_reported() {
        let f = fixture(None, Some(monthly())).await;

        let report = f.handler.handle(command(at(2024, 1, 5))).await.unwrap();

        assert!(report
            .outcomes
            .contains(&ObjectOutcome::NoOrderEntry { course_id: course(20) }));
        assert!(report
            .outcomes
            .contains(&ObjectOutcome::MembershipNotHeld { membership_id: plan() }));
    }

    #[tokio::test]
    async fn retraction_onto_today_expires_membership() {
        let meta = monthly();
        let f = fixture(Some(held(at(2024, 1, 10), &meta)), Some(meta)).await;

        let report = f.handler.handle(command(at(2024, 1, 10))).await.unwrap();

        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            ObjectOutcome::MembershipRetracted {
                retraction: Retraction::ExpiredToday { .. },
                ..
            }
        )));
        let m = current(&f).await;
        assert_eq!(m.status, MembershipStatus::Expired);
        assert_eq!(m.expiration, Some(at(2024, 1, 10)));
    }

    #[tokio::test]
    async fn retraction_of_renewed_term_keeps_membership_active() {
        let meta = monthly();
        let mut renewed = held(at(2024, 1, 10), &meta);
        renewed.expiration = Some(at(2024, 3, 10));
        let f = fixture(Some(renewed), Some(meta)).await;

        f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        let m = current(&f).await;
        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.expiration, Some(at(2024, 2, 10)));
    }

    #[tokio::test]
    async fn onetime_membership_expires_without_metadata() {
        let meta = MembershipMeta::new(9900, 0, Period::Month);
        let f = fixture(Some(held(at(2024, 1, 10), &meta)), None).await;

        let report = f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        assert!(report.outcomes.contains(&ObjectOutcome::MembershipRetracted {
            membership_id: plan(),
            retraction: Retraction::ExpiredOnetime,
        }));
        assert_eq!(current(&f).await.status, MembershipStatus::Expired);
    }

    #[tokio::test]
    async fn missing_metadata_skips_membership() {
        let meta = monthly();
        let original = held(at(2024, 1, 10), &meta);
        let f = fixture(Some(original.clone()), None).await;

        let report = f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            ObjectOutcome::Skipped { object: DomainObject::Membership(_), .. }
        )));
        assert_eq!(current(&f).await, original);
    }

    #[tokio::test]
    async fn expired_onetime_membership_still_pauses_membership_entries() {
        let meta = MembershipMeta::new(9900, 0, Period::Month);
        let mut expired = held(at(2024, 1, 10), &meta);
        expired.expire().unwrap();
        let f = fixture(Some(expired.clone()), None).await;
        let via_membership =
            Entry::granted(course(30), user(), EntryOrigin::Membership, at(2024, 1, 11));
        f.entries.save(&via_membership).await.unwrap();

        let report = f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        assert!(report.outcomes.contains(&ObjectOutcome::MembershipRetracted {
            membership_id: plan(),
            retraction: Retraction::ExpiredOnetime,
        }));
        assert_eq!(current(&f).await, expired);
        assert_eq!(f.entries.all().await[0].entry_status, EntryStatus::Paused);
    }

    #[tokio::test]
    async fn expired_membership_with_expiration_is_still_retracted() {
        let meta = monthly();
        let mut expired = held(at(2024, 1, 10), &meta);
        expired.expire().unwrap();
        let f = fixture(Some(expired), Some(meta)).await;

        f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        let m = current(&f).await;
        assert_eq!(m.status, MembershipStatus::Expired);
        assert_eq!(m.expiration, Some(at(2024, 1, 10)));
    }

    #[tokio::test]
    async fn retraction_pauses_membership_entries() {
        let meta = monthly();
        let f = fixture(Some(held(at(2024, 1, 10), &meta)), Some(meta)).await;
        let via_membership =
            Entry::granted(course(30), user(), EntryOrigin::Membership, at(2024, 1, 11));
        f.entries.save(&via_membership).await.unwrap();

        f.handler.handle(command(at(2024, 1, 20))).await.unwrap();

        assert_eq!(f.entries.all().await[0].entry_status, EntryStatus::Paused);
    }

    #[tokio::test]
    async fn failed_membership_write_is_reported() {
        let meta = monthly();
        let f = fixture(Some(held(at(2024, 1, 10), &meta)), Some(meta)).await;
        f.memberships.fail_updates(true).await;

        let err = f.handler.handle(command(at(2024, 1, 20))).await.unwrap_err();

        let report = err.report().unwrap();
        assert_eq!(report.failures[0].object, DomainObject::Membership(plan()));
        assert!(report
            .outcomes
            .contains(&ObjectOutcome::NoOrderEntry { course_id: course(20) }));
    }
}
