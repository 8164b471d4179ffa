//! Reconciliation configuration

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use super::error::ValidationError;

/// Largest offset any civil time zone uses, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Reconciliation behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Offset of the site's calendar from UTC, in minutes. Decides which
    /// calendar day "today" is when a retracted expiration is compared.
    #[serde(default)]
    pub calendar_utc_offset_minutes: i32,

    /// Complete paid orders of virtual, linked products without manual
    /// processing.
    #[serde(default = "default_true")]
    pub auto_complete_virtual_orders: bool,

    /// Grant free items at checkout while paid items await payment.
    #[serde(default = "default_true")]
    pub unlock_free_items_before_payment: bool,
}

impl ReconciliationConfig {
    /// The site calendar's offset from UTC.
    ///
    /// Falls back to UTC for an out-of-range value; `validate` rejects those.
    pub fn calendar_offset(&self) -> FixedOffset {
        self.calendar_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Validate reconciliation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.calendar_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset(
                self.calendar_utc_offset_minutes,
            ));
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            calendar_utc_offset_minutes: 0,
            auto_complete_virtual_orders: true,
            unlock_free_items_before_payment: true,
        }
    }
}

fn default_true() -> bool {
    true
}
