//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `catalog` - Objects linked to commerce products
//! - `enrollment` - Course entries and their lifecycle
//! - `membership` - User memberships, plan terms and expiration arithmetic
//! - `order` - Read-only commerce orders and lifecycle events

pub mod catalog;
pub mod enrollment;
pub mod foundation;
pub mod membership;
pub mod order;
