//! Strongly-typed identifier value objects.
//!
//! Catalog, order and user identifiers come from the host commerce system as
//! positive integers. Entry identifiers are minted locally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a positive integer identifier issued by the host system.
macro_rules! host_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates the identifier, rejecting zero.
            pub fn new(id: u64) -> Result<Self, ValidationError> {
                if id == 0 {
                    return Err(ValidationError::out_of_range($field, 1, i64::MAX, 0));
                }
                Ok(Self(id))
            }

            /// Returns the raw integer value.
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ValidationError::invalid_format($field, e.to_string()))?;
                Self::new(raw)
            }
        }
    };
}

host_id!(
    /// Identifier of a platform user.
    UserId,
    "user_id"
);

host_id!(
    /// Identifier of a course object.
    CourseId,
    "course_id"
);

host_id!(
    /// Identifier of a membership plan object.
    MembershipId,
    "membership_id"
);

host_id!(
    /// Identifier of a commerce order.
    OrderId,
    "order_id"
);

host_id!(
    /// Identifier of a commerce product.
    ProductId,
    "product_id"
);

/// Unique identifier for a course entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Creates a new random EntryId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an EntryId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
