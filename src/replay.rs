//! Fixture replay.
//!
//! Loads a catalog, plans, orders and prior state into the in-memory
//! adapters, dispatches a sequence of notifications through the engine and
//! collects the resulting state.
//!
//! # Fixture format
//!
//! ```json
//! {
//!   "catalog": [{ "product_id": 1, "object": { "type": "course", "id": 10 } }],
//!   "plans": [{ "membership_id": 40, "price": 1500, "duration": 1, "period": "month" }],
//!   "orders": [{ "id": 100, "user_id": 7, "status": "pending",
//!                "items": [{ "product_id": 1, "line_total": 4900 }] }],
//!   "steps": [{ "order_status": "processing",
//!               "event": { "type": "order_ready", "order_id": 100, "previous_status": "pending" },
//!               "occurred_at": "2024-01-10T12:00:00Z" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::memory::{
    InMemoryCatalog, InMemoryEntryRepository, InMemoryMembershipRepository,
    InMemoryMembershipService, InMemoryOrderReader,
};
use crate::application::{
    ReconciliationEngine, ReconciliationError, ReconciliationPorts, ReconciliationReport,
};
use crate::config::ReconciliationConfig;
use crate::domain::catalog::CatalogLink;
use crate::domain::enrollment::Entry;
use crate::domain::foundation::{MembershipId, OrderId};
use crate::domain::membership::{MembershipMeta, UserMembership};
use crate::domain::order::{Order, OrderNotification, OrderStatus};

/// Plan metadata keyed by plan id.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRecord {
    pub membership_id: MembershipId,
    #[serde(flatten)]
    pub meta: MembershipMeta,
}

/// One notification, optionally preceded by an order status change.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayStep {
    /// Status the host moved the order to before notifying.
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(flatten)]
    pub notification: OrderNotification,
}

/// Initial state plus the notifications to replay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub catalog: Vec<CatalogLink>,
    #[serde(default)]
    pub plans: Vec<PlanRecord>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub memberships: Vec<UserMembership>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    Applied,
    Noop,
    PartiallyApplied,
    Failed,
}

/// What one replayed notification did.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub order_id: OrderId,
    pub event: &'static str,
    pub result: StepResult,
    pub applied: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepSummary {
    fn new(
        notification: &OrderNotification,
        outcome: Result<ReconciliationReport, ReconciliationError>,
    ) -> Self {
        let order_id = notification.event.order_id();
        let event = notification.event.event_type();
        match outcome {
            Ok(report) => Self {
                order_id,
                event,
                result: if report.is_noop() {
                    StepResult::Noop
                } else {
                    StepResult::Applied
                },
                applied: report.outcomes.len(),
                failed: 0,
                error: None,
            },
            Err(ReconciliationError::PartiallyApplied(report)) => Self {
                order_id,
                event,
                result: StepResult::PartiallyApplied,
                applied: report.outcomes.len(),
                failed: report.failures.len(),
                error: report.failures.first().map(|f| f.error.to_string()),
            },
            Err(e) => Self {
                order_id,
                event,
                result: StepResult::Failed,
                applied: 0,
                failed: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

/// State after the replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    pub steps: Vec<StepSummary>,
    pub entries: Vec<Entry>,
    pub memberships: Vec<UserMembership>,
}

/// Replay `fixture` through a fresh engine.
pub async fn replay(fixture: Fixture, config: &ReconciliationConfig) -> ReplayOutput {
    let orders = Arc::new(InMemoryOrderReader::with_orders(fixture.orders));
    let catalog = Arc::new(InMemoryCatalog::with_links(fixture.catalog));
    let entries = Arc::new(InMemoryEntryRepository::with_entries(fixture.entries));
    let memberships = Arc::new(InMemoryMembershipRepository::with_memberships(
        fixture.memberships,
    ));
    let membership_service = Arc::new(InMemoryMembershipService::new(
        memberships.clone(),
        entries.clone(),
    ));
    for plan in fixture.plans {
        membership_service.define_plan(plan.membership_id, plan.meta).await;
    }

    let engine = ReconciliationEngine::new(
        ReconciliationPorts {
            orders: orders.clone(),
            catalog,
            entries: entries.clone(),
            memberships: memberships.clone(),
            membership_service,
        },
        config,
    );

    let mut steps = Vec::with_capacity(fixture.steps.len());
    for step in fixture.steps {
        if let Some(status) = step.order_status {
            let order_id = step.notification.event.order_id();
            if orders.set_status(order_id, status).await.is_none() {
                tracing::warn!(order_id = %order_id, "Status change for unknown order");
            }
        }
        let outcome = engine.dispatch(step.notification).await;
        steps.push(StepSummary::new(&step.notification, outcome));
    }

    ReplayOutput {
        steps,
        entries: entries.all().await,
        memberships: memberships.all().await,
    }
}
