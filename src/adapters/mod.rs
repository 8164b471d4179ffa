//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory stores and collaborators

pub mod memory;

pub use memory::{
    InMemoryCatalog, InMemoryEntryRepository, InMemoryMembershipRepository,
    InMemoryMembershipService, InMemoryOrderReader, MembershipGrant,
};
