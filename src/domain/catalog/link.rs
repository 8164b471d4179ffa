//! Product-to-object link records.

use serde::{Deserialize, Serialize};

use super::DomainObject;
use crate::domain::foundation::ProductId;

/// Association between a commerce product and the object it unlocks.
///
/// A product links to at most one object; an object links to at most one
/// product. Only published objects are visible to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLink {
    pub product_id: ProductId,
    pub object: DomainObject,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl CatalogLink {
    /// Creates a link to a published object.
    pub fn published(product_id: ProductId, object: DomainObject) -> Self {
        Self {
            product_id,
            object,
            published: true,
        }
    }

    /// Creates a link to an object that is not (yet) published.
    pub fn draft(product_id: ProductId, object: DomainObject) -> Self {
        Self {
            product_id,
            object,
            published: false,
        }
    }
}
