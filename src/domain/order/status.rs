//! Order status as reported by the commerce system.

use serde::{Deserialize, Serialize};

/// Commerce order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    Pending,

    /// Paid, awaiting fulfilment.
    Processing,

    /// Paid and fulfilled.
    Completed,

    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// Payment confirmed; every item may be fulfilled.
    pub fn is_ready(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Completed)
    }

    /// The order will never be fulfilled.
    pub fn is_terminated(&self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Refunded | OrderStatus::Failed
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
