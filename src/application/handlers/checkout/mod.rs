//! Checkout handlers.
//!
//! ## Queries
//! - Status for a freshly paid order
//! - Membership replacement when adding to a cart

mod membership_cart;
mod payment_complete_status;

pub use membership_cart::{AddToCartQuery, AddToCartResult, CartLine, MembershipCartHandler};
pub use payment_complete_status::{
    PaymentCompleteStatusHandler, PaymentCompleteStatusQuery, PaymentCompleteStatusResult,
};
