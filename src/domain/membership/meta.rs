//! Membership plan metadata.

use serde::{Deserialize, Serialize};

use super::expiration::{shift, Direction, ExpirationError, Period};
use crate::domain::foundation::Timestamp;

/// Pricing and term of a membership plan.
///
/// A `duration` of zero describes a one-time plan that never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipMeta {
    /// Price in cents.
    pub price: i64,
    pub duration: u32,
    pub period: Period,
}

impl MembershipMeta {
    pub fn new(price: i64, duration: u32, period: Period) -> Self {
        Self {
            price,
            duration,
            period,
        }
    }

    pub fn is_onetime(&self) -> bool {
        self.duration == 0
    }

    /// Expiration of a term that starts at `starts_at`, `None` for one-time plans.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the term end is not representable.
    pub fn term_end(&self, starts_at: Timestamp) -> Result<Option<Timestamp>, ExpirationError> {
        if self.is_onetime() {
            return Ok(None);
        }
        shift(starts_at, self.duration, self.period, Direction::Extend).map(Some)
    }
}
