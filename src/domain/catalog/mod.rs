//! Catalog domain module.
//!
//! Objects (courses, membership plans) that commerce products unlock.

mod domain_object;
mod link;

pub use domain_object::{DomainObject, ObjectKind};
pub use link::CatalogLink;
