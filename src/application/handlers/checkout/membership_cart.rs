//! MembershipCartHandler - Keeps at most one membership plan in a cart.
//!
//! Adding a membership product never fails. If the cart already holds a
//! different membership, the handler names the cart line the host should
//! drop so the new plan replaces the old one.

use std::sync::Arc;

use crate::domain::catalog::DomainObject;
use crate::domain::foundation::ProductId;
use crate::ports::{CatalogResolver, StoreError};

/// One line already in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Host's key for the line.
    pub key: String,
    pub product_id: ProductId,
}

/// Query run when a product is about to be added to a cart.
#[derive(Debug, Clone)]
pub struct AddToCartQuery {
    pub product_id: ProductId,
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCartResult {
    /// Key of the cart line to remove, if any.
    pub replaces: Option<String>,
}

pub struct MembershipCartHandler {
    catalog: Arc<dyn CatalogResolver>,
}

impl MembershipCartHandler {
    pub fn new(catalog: Arc<dyn CatalogResolver>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: AddToCartQuery) -> Result<AddToCartResult, StoreError> {
        let adds_membership = self
            .catalog
            .resolve(&[query.product_id])
            .await?
            .iter()
            .any(|object| matches!(object, DomainObject::Membership(_)));

        if !adds_membership {
            return Ok(AddToCartResult { replaces: None });
        }

        for line in query.cart.iter().filter(|l| l.product_id != query.product_id) {
            let objects = self.catalog.resolve(&[line.product_id]).await?;
            for object in objects {
                if !matches!(object, DomainObject::Membership(_)) {
                    continue;
                }
                // The line's product must still own the plan link.
                if self.catalog.product_for(object).await? == Some(line.product_id) {
                    tracing::debug!(
                        product_id = %query.product_id,
                        replaced = %line.key,
                        "Membership in cart replaced"
                    );
                    return Ok(AddToCartResult {
                        replaces: Some(line.key.clone()),
                    });
                }
            }
        }

        Ok(AddToCartResult { replaces: None })
    }
}
