//! Order and line item records.
//!
//! Orders are owned by the commerce system. Reconciliation only reads them.

use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::domain::foundation::{OrderId, ProductId, UserId};

/// One purchased product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,

    /// Line total in cents, after discounts.
    pub line_total: i64,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Product needs no shipping.
    #[serde(default)]
    pub is_virtual: bool,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    pub fn new(product_id: ProductId, line_total: i64) -> Self {
        Self {
            product_id,
            line_total,
            quantity: 1,
            is_virtual: false,
        }
    }

    /// Marks the line as a virtual (non-shipped) product.
    pub fn virtual_product(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Free lines unlock before payment and are never revoked.
    pub fn is_free(&self) -> bool {
        self.line_total == 0
    }
}

/// Commerce order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn new(id: OrderId, user_id: UserId, status: OrderStatus, items: Vec<LineItem>) -> Self {
        Self {
            id,
            user_id,
            status,
            items,
        }
    }

    /// Products whose objects may be granted now.
    ///
    /// Nothing for a terminated order, every product once payment is
    /// confirmed, and only free products before that.
    pub fn fulfillable_product_ids(&self) -> Vec<ProductId> {
        if self.status.is_terminated() {
            return Vec::new();
        }
        let ready = self.status.is_ready();
        unique_products(self.items.iter().filter(|item| ready || item.is_free()))
    }

    /// Products the customer was charged for.
    pub fn charged_product_ids(&self) -> Vec<ProductId> {
        unique_products(self.items.iter().filter(|item| !item.is_free()))
    }

    /// All distinct products in the order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        unique_products(self.items.iter())
    }

    /// True if every line is a virtual product.
    pub fn is_virtual_only(&self) -> bool {
        self.items.iter().all(|item| item.is_virtual)
    }
}

fn unique_products<'a>(items: impl Iterator<Item = &'a LineItem>) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = Vec::new();
    for item in items {
        if !ids.contains(&item.product_id) {
            ids.push(item.product_id);
        }
    }
    ids
}
