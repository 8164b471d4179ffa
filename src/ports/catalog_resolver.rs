//! Catalog resolver port.
//!
//! Maps commerce products to the courses and membership plans they unlock,
//! and back.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::catalog::DomainObject;
use crate::domain::foundation::ProductId;

/// Port for product ⇄ object lookups.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// Published objects linked to any of `product_ids`.
    ///
    /// An empty result is not an error: the products simply unlock nothing.
    async fn resolve(&self, product_ids: &[ProductId]) -> Result<Vec<DomainObject>, StoreError>;

    /// Product linked to `object`, if any.
    async fn product_for(&self, object: DomainObject) -> Result<Option<ProductId>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolver_is_object_safe() {
        fn _accepts_dyn(_resolver: &dyn CatalogResolver) {}
    }
}
