//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! reconciliation and the systems around it. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `EntryRepository` - Course entries
//! - `MembershipRepository` - One membership record per user
//!
//! ## Collaborator Ports
//!
//! - `CatalogResolver` - Product ⇄ course/membership links
//! - `MembershipService` - Membership setup, membership entries, plan metadata
//! - `OrderReader` - Commerce orders by id

mod catalog_resolver;
mod entry_repository;
mod membership_repository;
mod membership_service;
mod order_reader;
mod store_error;

pub use catalog_resolver::CatalogResolver;
pub use entry_repository::{EntryFilter, EntryRepository};
pub use membership_repository::MembershipRepository;
pub use membership_service::MembershipService;
pub use order_reader::OrderReader;
pub use store_error::StoreError;
