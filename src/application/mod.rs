//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The engine is the entry point; handlers do the per-order work.

mod engine;
pub mod handlers;
mod keyed_lock;

pub use engine::{ReconciliationEngine, ReconciliationPorts};
pub use handlers::{
    // Checkout queries
    AddToCartQuery, AddToCartResult, CartLine, MembershipCartHandler,
    PaymentCompleteStatusHandler, PaymentCompleteStatusQuery, PaymentCompleteStatusResult,
    // Fulfillment commands
    FulfillOrderCommand, FulfillOrderHandler, ObjectFailure, ObjectOutcome,
    ReconciliationError, ReconciliationReport, RevokeOrderCommand, RevokeOrderHandler,
};
pub use keyed_lock::KeyedLocks;
