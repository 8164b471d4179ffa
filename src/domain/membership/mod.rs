//! Membership domain module.
//!
//! User membership records, plan metadata and expiration arithmetic.
//!
//! # Module Structure
//!
//! - `aggregate` - UserMembership record and term retraction
//! - `status` - MembershipStatus state machine
//! - `meta` - MembershipMeta plan pricing and term
//! - `expiration` - Calendar-aware expiration shifting

mod aggregate;
mod expiration;
mod meta;
mod status;

pub use aggregate::{Retraction, UserMembership};
pub use expiration::{shift, Direction, ExpirationError, Period};
pub use meta::MembershipMeta;
pub use status::MembershipStatus;
