//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod checkout;
pub mod fulfillment;

pub use checkout::{
    AddToCartQuery, AddToCartResult, CartLine, MembershipCartHandler,
    PaymentCompleteStatusHandler, PaymentCompleteStatusQuery, PaymentCompleteStatusResult,
};
pub use fulfillment::{
    FulfillOrderCommand, FulfillOrderHandler, ObjectFailure, ObjectOutcome,
    ReconciliationError, ReconciliationReport, RevokeOrderCommand, RevokeOrderHandler,
};
