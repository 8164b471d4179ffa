//! Order domain module.
//!
//! Read-only view of commerce orders and the events that report their
//! lifecycle.

mod event;
#[allow(clippy::module_inception)]
mod order;
mod status;

pub use event::{OrderEvent, OrderNotification};
pub use order::{LineItem, Order};
pub use status::OrderStatus;
