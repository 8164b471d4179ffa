//! Order lifecycle events delivered by the commerce host.
//!
//! The host may deliver any event more than once and in any order. Every
//! consumer must treat them as idempotent notifications, not commands.

use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::domain::foundation::{OrderId, Timestamp};

/// Something happened to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// Checkout created the order.
    ///
    /// When the cart still needs payment, free items unlock right away and
    /// paid items wait for a later status change.
    CheckoutProcessed {
        order_id: OrderId,
        needs_payment: bool,
    },

    /// The order's status changed.
    ///
    /// `previous_status` is the status before this change, if the host knows
    /// it. It guards membership setup against repeated notifications.
    OrderReady {
        order_id: OrderId,
        previous_status: Option<OrderStatus>,
    },

    /// The order was cancelled.
    OrderCancelled { order_id: OrderId },

    /// The order was refunded.
    OrderRefunded { order_id: OrderId },
}

impl OrderEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::CheckoutProcessed { order_id, .. }
            | OrderEvent::OrderReady { order_id, .. }
            | OrderEvent::OrderCancelled { order_id }
            | OrderEvent::OrderRefunded { order_id } => *order_id,
        }
    }

    /// Dotted event name used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::CheckoutProcessed { .. } => "order.checkout_processed",
            OrderEvent::OrderReady { .. } => "order.ready",
            OrderEvent::OrderCancelled { .. } => "order.cancelled",
            OrderEvent::OrderRefunded { .. } => "order.refunded",
        }
    }
}

/// An order event with the moment the host observed it.
///
/// `occurred_at` dates new entries and defines "today" for expiration checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub event: OrderEvent,
    pub occurred_at: Timestamp,
}

impl OrderNotification {
    pub fn new(event: OrderEvent, occurred_at: Timestamp) -> Self {
        Self { event, occurred_at }
    }

    /// Notification stamped with the current time.
    pub fn now(event: OrderEvent) -> Self {
        Self::new(event, Timestamp::now())
    }
}
