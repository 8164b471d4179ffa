//! In-memory order book.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::OrderId;
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{OrderReader, StoreError};

/// In-memory `OrderReader`. The host side of the book is writable so tests
/// can move orders through their lifecycle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderReader {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        let map = orders.into_iter().map(|o| (o.id, o)).collect();
        Self {
            orders: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn upsert(&self, order: Order) {
        self.orders.write().await.insert(order.id, order);
    }

    /// Change an order's status, returning the previous one.
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Option<OrderStatus> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&order_id)?;
        Some(std::mem::replace(&mut order.status, status))
    }
}

#[async_trait]
impl OrderReader for InMemoryOrderReader {
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }
}
