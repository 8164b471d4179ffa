//! Reconciliation engine - routes order notifications to handlers.
//!
//! The engine is the one entry point a host calls. It loads the order,
//! serializes work per user and picks fulfilment or revocation.
//!
//! ## Event routing
//!
//! | Event | Action |
//! |-------|--------|
//! | `CheckoutProcessed` needing payment | Fulfil free items |
//! | `CheckoutProcessed` paid in full | Nothing; the status change follows |
//! | `OrderReady` | Fulfil |
//! | `OrderCancelled`, `OrderRefunded` | Revoke |

use std::sync::Arc;

use super::handlers::{
    AddToCartQuery, AddToCartResult, FulfillOrderCommand, FulfillOrderHandler,
    MembershipCartHandler, PaymentCompleteStatusHandler, PaymentCompleteStatusQuery,
    ReconciliationError, ReconciliationReport, RevokeOrderCommand, RevokeOrderHandler,
};
use super::keyed_lock::KeyedLocks;
use crate::config::ReconciliationConfig;
use crate::domain::foundation::{OrderId, UserId};
use crate::domain::order::{OrderEvent, OrderNotification, OrderStatus};
use crate::ports::{
    CatalogResolver, EntryRepository, MembershipRepository, MembershipService, OrderReader,
    StoreError,
};

/// Every port the engine depends on.
#[derive(Clone)]
pub struct ReconciliationPorts {
    pub orders: Arc<dyn OrderReader>,
    pub catalog: Arc<dyn CatalogResolver>,
    pub entries: Arc<dyn EntryRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub membership_service: Arc<dyn MembershipService>,
}

pub struct ReconciliationEngine {
    orders: Arc<dyn OrderReader>,
    fulfill: FulfillOrderHandler,
    revoke: RevokeOrderHandler,
    payment_status: PaymentCompleteStatusHandler,
    cart: MembershipCartHandler,
    locks: KeyedLocks<UserId>,
    unlock_free_items_before_payment: bool,
}

impl ReconciliationEngine {
    pub fn new(ports: ReconciliationPorts, config: &ReconciliationConfig) -> Self {
        Self {
            fulfill: FulfillOrderHandler::new(
                ports.catalog.clone(),
                ports.entries.clone(),
                ports.membership_service.clone(),
            ),
            revoke: RevokeOrderHandler::new(
                ports.catalog.clone(),
                ports.entries,
                ports.memberships,
                ports.membership_service,
                config.calendar_offset(),
            ),
            payment_status: PaymentCompleteStatusHandler::new(
                ports.catalog.clone(),
                config.auto_complete_virtual_orders,
            ),
            cart: MembershipCartHandler::new(ports.catalog),
            orders: ports.orders,
            locks: KeyedLocks::new(),
            unlock_free_items_before_payment: config.unlock_free_items_before_payment,
        }
    }

    /// Reconcile the user's entitlements with the order the event names.
    ///
    /// Unknown orders and events with nothing to do return an empty report.
    ///
    /// # Errors
    ///
    /// - `Store` if the order or its links could not be read; nothing changed
    /// - `PartiallyApplied` if some objects failed; the report lists both sides
    #[tracing::instrument(
        name = "dispatch",
        skip_all,
        fields(order_id = %notification.event.order_id(), event = notification.event.event_type())
    )]
    pub async fn dispatch(
        &self,
        notification: OrderNotification,
    ) -> Result<ReconciliationReport, ReconciliationError> {
        let order_id = notification.event.order_id();

        let Some(order) = self.orders.find_by_id(order_id).await? else {
            tracing::debug!("Order not found, ignoring event");
            return Ok(ReconciliationReport::new(order_id));
        };

        let _guard = self.locks.lock(order.user_id).await;

        match notification.event {
            OrderEvent::CheckoutProcessed { needs_payment, .. } => {
                if !needs_payment || !self.unlock_free_items_before_payment {
                    tracing::debug!(needs_payment, "Checkout leaves fulfilment to status change");
                    return Ok(ReconciliationReport::new(order_id));
                }
                self.fulfill
                    .handle(FulfillOrderCommand {
                        order,
                        previous_status: None,
                        occurred_at: notification.occurred_at,
                    })
                    .await
            }
            OrderEvent::OrderReady {
                previous_status, ..
            } => {
                self.fulfill
                    .handle(FulfillOrderCommand {
                        order,
                        previous_status,
                        occurred_at: notification.occurred_at,
                    })
                    .await
            }
            OrderEvent::OrderCancelled { .. } | OrderEvent::OrderRefunded { .. } => {
                self.revoke
                    .handle(RevokeOrderCommand {
                        order,
                        occurred_at: notification.occurred_at,
                    })
                    .await
            }
        }
    }

    /// Status the host should apply when payment for `order_id` completes.
    ///
    /// Unknown orders keep the proposed status.
    pub async fn status_on_payment(
        &self,
        order_id: OrderId,
        proposed: OrderStatus,
    ) -> Result<OrderStatus, StoreError> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Ok(proposed);
        };
        let result = self
            .payment_status
            .handle(PaymentCompleteStatusQuery { order, proposed })
            .await?;
        Ok(result.status)
    }

    /// Cart line to drop when a product is added to a cart.
    pub async fn add_to_cart(&self, query: AddToCartQuery) -> Result<AddToCartResult, StoreError> {
        self.cart.handle(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCatalog, InMemoryEntryRepository, InMemoryMembershipRepository,
        InMemoryMembershipService, InMemoryOrderReader,
    };
    use crate::domain::catalog::{CatalogLink, DomainObject};
    use crate::domain::enrollment::EntryStatus;
    use crate::domain::foundation::{CourseId, ProductId, Timestamp};
    use crate::domain::order::{LineItem, Order};
    use chrono::{TimeZone, Utc};

    fn pid(id: u64) -> ProductId {
        ProductId::new(id).unwrap()
    }

    fn oid() -> OrderId {
        OrderId::new(1).unwrap()
    }

    struct Fixture {
        orders: Arc<InMemoryOrderReader>,
        entries: Arc<InMemoryEntryRepository>,
        engine: ReconciliationEngine,
    }

    fn fixture(config: ReconciliationConfig) -> Fixture {
        let orders = Arc::new(InMemoryOrderReader::with_orders(vec![Order::new(
            oid(),
            UserId::new(2).unwrap(),
            OrderStatus::Pending,
            vec![
                LineItem::new(pid(1), 0).virtual_product(),
                LineItem::new(pid(2), 900).virtual_product(),
            ],
        )]));
        let catalog = Arc::new(InMemoryCatalog::with_links(vec![
            CatalogLink::published(pid(1), DomainObject::Course(CourseId::new(10).unwrap())),
            CatalogLink::published(pid(2), DomainObject::Course(CourseId::new(20).unwrap())),
        ]));
        let entries = Arc::new(InMemoryEntryRepository::new());
        let memberships = Arc::new(InMemoryMembershipRepository::new());
        let membership_service = Arc::new(InMemoryMembershipService::new(
            memberships.clone(),
            entries.clone(),
        ));
        let engine = ReconciliationEngine::new(
            ReconciliationPorts {
                orders: orders.clone(),
                catalog,
                entries: entries.clone(),
                memberships,
                membership_service,
            },
            &config,
        );
        Fixture {
            orders,
            entries,
            engine,
        }
    }

    fn checkout(needs_payment: bool) -> OrderNotification {
        OrderNotification::now(OrderEvent::CheckoutProcessed {
            order_id: oid(),
            needs_payment,
        })
    }

    #[tokio::test]
    async fn unknown_order_is_noop() {
        let f = fixture(ReconciliationConfig::default());
        let missing = OrderId::new(99).unwrap();

        let report = f
            .engine
            .dispatch(OrderNotification::now(OrderEvent::OrderCancelled {
                order_id: missing,
            }))
            .await
            .unwrap();

        assert!(report.is_noop());
        assert_eq!(report.order_id, missing);
    }

    #[tokio::test]
    async fn checkout_needing_payment_unlocks_free_items() {
        let f = fixture(ReconciliationConfig::default());

        let report = f.engine.dispatch(checkout(true)).await.unwrap();

        assert_eq!(report.created_entries(), vec![CourseId::new(10).unwrap()]);
    }

    #[tokio::test]
    async fn checkout_without_payment_defers_to_status_change() {
        let f = fixture(ReconciliationConfig::default());

        let report = f.engine.dispatch(checkout(false)).await.unwrap();

        assert!(report.is_noop());
        assert!(f.entries.all().await.is_empty());
    }

    #[tokio::test]
    async fn free_item_unlock_can_be_disabled() {
        let f = fixture(ReconciliationConfig {
            unlock_free_items_before_payment: false,
            ..ReconciliationConfig::default()
        });

        let report = f.engine.dispatch(checkout(true)).await.unwrap();

        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn ready_then_refunded_round_trip() {
        let f = fixture(ReconciliationConfig::default());
        f.orders.set_status(oid(), OrderStatus::Processing).await;
        f.engine
            .dispatch(OrderNotification::now(OrderEvent::OrderReady {
                order_id: oid(),
                previous_status: Some(OrderStatus::Pending),
            }))
            .await
            .unwrap();
        assert_eq!(f.entries.all().await.len(), 2);

        f.orders.set_status(oid(), OrderStatus::Refunded).await;
        f.engine
            .dispatch(OrderNotification::now(OrderEvent::OrderRefunded { order_id: oid() }))
            .await
            .unwrap();

        let statuses: Vec<_> = f.entries.all().await.iter().map(|e| e.entry_status).collect();
        assert_eq!(
            statuses,
            vec![EntryStatus::InProgress, EntryStatus::Cancelled]
        );
    }

    #[tokio::test]
    async fn status_on_payment_completes_virtual_orders() {
        let f = fixture(ReconciliationConfig::default());

        let status = f
            .engine
            .status_on_payment(oid(), OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(status, OrderStatus::Completed);

        let unknown = f
            .engine
            .status_on_payment(OrderId::new(42).unwrap(), OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(unknown, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn occurred_at_dates_new_entries() {
        let f = fixture(ReconciliationConfig::default());
        let at = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());

        f.engine
            .dispatch(OrderNotification::new(
                OrderEvent::CheckoutProcessed {
                    order_id: oid(),
                    needs_payment: true,
                },
                at,
            ))
            .await
            .unwrap();

        assert_eq!(f.entries.all().await[0].entry_date, at);
    }
}
