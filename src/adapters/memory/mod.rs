//! In-memory adapters for every port.
//!
//! Used by tests and the replay binary. Each store guards its records with a
//! `tokio::sync::RwLock` and is cheap to clone.

mod catalog;
mod entry_repository;
mod membership_repository;
mod membership_service;
mod order_reader;

pub use catalog::InMemoryCatalog;
pub use entry_repository::InMemoryEntryRepository;
pub use membership_repository::InMemoryMembershipRepository;
pub use membership_service::{InMemoryMembershipService, MembershipGrant};
pub use order_reader::InMemoryOrderReader;
