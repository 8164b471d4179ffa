//! Membership expiration arithmetic.
//!
//! Month and year steps follow the calendar: when the target month is shorter
//! than the base day, the result lands on the target month's last day.

use chrono::{Days, Months};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Unit of a membership term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        };
        write!(f, "{}", s)
    }
}

/// Whether a term is added to or removed from a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Extend,
    Retract,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpirationError {
    #[error("shifting {base} by {duration} {period} leaves the supported date range")]
    OutOfRange {
        base: Timestamp,
        duration: u32,
        period: Period,
    },
}

/// Moves `base` by `duration` periods in `direction`.
///
/// # Errors
///
/// Returns `OutOfRange` if the result is not a representable date.
pub fn shift(
    base: Timestamp,
    duration: u32,
    period: Period,
    direction: Direction,
) -> Result<Timestamp, ExpirationError> {
    let dt = *base.as_datetime();

    let shifted = match period {
        Period::Day | Period::Week => {
            let per_unit = if period == Period::Week { 7 } else { 1 };
            let days = Days::new(u64::from(duration) * per_unit);
            match direction {
                Direction::Extend => dt.checked_add_days(days),
                Direction::Retract => dt.checked_sub_days(days),
            }
        }
        Period::Month | Period::Year => {
            let per_unit = if period == Period::Year { 12 } else { 1 };
            duration.checked_mul(per_unit).map(Months::new).and_then(|months| {
                match direction {
                    Direction::Extend => dt.checked_add_months(months),
                    Direction::Retract => dt.checked_sub_months(months),
                }
            })
        }
    };

    shifted
        .map(Timestamp::from_datetime)
        .ok_or(ExpirationError::OutOfRange {
            base,
            duration,
            period,
        })
}
