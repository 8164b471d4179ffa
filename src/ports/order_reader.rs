//! Order reader port.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::foundation::OrderId;
use crate::domain::order::Order;

/// Read access to commerce orders.
#[async_trait]
pub trait OrderReader: Send + Sync {
    /// The order with `order_id`, `None` if the host does not know it.
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;
}
