//! PaymentCompleteStatusHandler - Picks the status a freshly paid order moves to.
//!
//! Orders made only of virtual products that all unlock something need no
//! manual processing, so they skip straight to `completed`.

use std::sync::Arc;

use crate::domain::order::{Order, OrderStatus};
use crate::ports::{CatalogResolver, StoreError};

/// Query for the status to apply once payment completes.
#[derive(Debug, Clone)]
pub struct PaymentCompleteStatusQuery {
    pub order: Order,

    /// Status the host is about to apply.
    pub proposed: OrderStatus,
}

/// Status the host should apply instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentCompleteStatusResult {
    pub status: OrderStatus,
}

pub struct PaymentCompleteStatusHandler {
    catalog: Arc<dyn CatalogResolver>,
    auto_complete: bool,
}

impl PaymentCompleteStatusHandler {
    pub fn new(catalog: Arc<dyn CatalogResolver>, auto_complete: bool) -> Self {
        Self {
            catalog,
            auto_complete,
        }
    }

    pub async fn handle(
        &self,
        query: PaymentCompleteStatusQuery,
    ) -> Result<PaymentCompleteStatusResult, StoreError> {
        let keep = PaymentCompleteStatusResult {
            status: query.proposed,
        };

        if !self.auto_complete || query.proposed != OrderStatus::Processing {
            return Ok(keep);
        }

        let order = &query.order;
        if order.items.is_empty() || !order.is_virtual_only() {
            return Ok(keep);
        }

        let product_ids = order.product_ids();
        let objects = self.catalog.resolve(&product_ids).await?;
        if objects.is_empty() || objects.len() != product_ids.len() {
            return Ok(keep);
        }

        tracing::debug!(order_id = %order.id, "Virtual-only order completes on payment");
        Ok(PaymentCompleteStatusResult {
            status: OrderStatus::Completed,
        })
    }
}
