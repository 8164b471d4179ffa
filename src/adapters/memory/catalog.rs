//! In-memory catalog of product links.
//!
//! Holds the product ⇄ object links the host would keep in product and
//! object metadata. Used by tests and the replay binary.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::catalog::{CatalogLink, DomainObject};
use crate::domain::foundation::ProductId;
use crate::ports::{CatalogResolver, StoreError};

/// In-memory `CatalogResolver`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    links: Arc<RwLock<Vec<CatalogLink>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with `links`.
    pub fn with_links(links: Vec<CatalogLink>) -> Self {
        Self {
            links: Arc::new(RwLock::new(links)),
        }
    }

    /// Add a link, replacing any existing link for the same product or object.
    pub async fn link(&self, link: CatalogLink) {
        let mut links = self.links.write().await;
        links.retain(|l| l.product_id != link.product_id && l.object != link.object);
        links.push(link);
    }

    /// Publish or unpublish the object behind a link.
    pub async fn set_published(&self, object: DomainObject, published: bool) {
        let mut links = self.links.write().await;
        for link in links.iter_mut().filter(|l| l.object == object) {
            link.published = published;
        }
    }
}

#[async_trait]
impl CatalogResolver for InMemoryCatalog {
    async fn resolve(&self, product_ids: &[ProductId]) -> Result<Vec<DomainObject>, StoreError> {
        let links = self.links.read().await;
        Ok(product_ids
            .iter()
            .filter_map(|id| {
                links
                    .iter()
                    .find(|l| l.published && l.product_id == *id)
                    .map(|l| l.object)
            })
            .collect())
    }

    async fn product_for(&self, object: DomainObject) -> Result<Option<ProductId>, StoreError> {
        let links = self.links.read().await;
        Ok(links
            .iter()
            .find(|l| l.object == object)
            .map(|l| l.product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, MembershipId};

    fn pid(id: u64) -> ProductId {
        ProductId::new(id).unwrap()
    }

    fn course(id: u64) -> DomainObject {
        DomainObject::Course(CourseId::new(id).unwrap())
    }

    #[tokio::test]
    async fn resolves_published_objects_in_product_order() {
        let catalog = InMemoryCatalog::with_links(vec![
            CatalogLink::published(pid(1), course(10)),
            CatalogLink::published(
                pid(2),
                DomainObject::Membership(MembershipId::new(20).unwrap()),
            ),
        ]);

        let objects = catalog.resolve(&[pid(2), pid(1)]).await.unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1], course(10));
    }

    #[tokio::test]
    async fn drafts_and_unknown_products_resolve_to_nothing() {
        let catalog = InMemoryCatalog::with_links(vec![CatalogLink::draft(pid(1), course(10))]);

        assert!(catalog.resolve(&[pid(1), pid(9)]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unpublishing_hides_object_but_keeps_product_lookup() {
        let catalog = InMemoryCatalog::new();
        catalog.link(CatalogLink::published(pid(1), course(10))).await;
        catalog.set_published(course(10), false).await;

        assert!(catalog.resolve(&[pid(1)]).await.unwrap().is_empty());
        assert_eq!(catalog.product_for(course(10)).await.unwrap(), Some(pid(1)));
    }

    #[tokio::test]
    async fn relinking_replaces_previous_link() {
        let catalog = InMemoryCatalog::new();
        catalog.link(CatalogLink::published(pid(1), course(10))).await;
        catalog.link(CatalogLink::published(pid(2), course(10))).await;

        assert!(catalog.resolve(&[pid(1)]).await.unwrap().is_empty());
        assert_eq!(catalog.product_for(course(10)).await.unwrap(), Some(pid(2)));
    }
}
