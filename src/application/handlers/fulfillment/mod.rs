//! Fulfillment handlers.
//!
//! ## Commands
//! - Fulfilling a ready order, or the free items of an unpaid one
//! - Revoking a cancelled or refunded order

mod fulfill_order;
mod report;
mod revoke_order;

pub use fulfill_order::{FulfillOrderCommand, FulfillOrderHandler};
pub use report::{ObjectFailure, ObjectOutcome, ReconciliationError, ReconciliationReport};
pub use revoke_order::{RevokeOrderCommand, RevokeOrderHandler};
