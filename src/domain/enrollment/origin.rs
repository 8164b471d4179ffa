//! Entry origin tags.

use serde::{Deserialize, Serialize};

/// Process that created an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Granted by an administrator.
    Manual,

    /// Created by fulfilling a commerce order; `payment_id` holds the order.
    CommerceOrder,

    /// Unlocked through the user's membership.
    Membership,

    /// Any other integration.
    Other,
}

impl EntryOrigin {
    /// Human-readable label for admin listings.
    pub fn label(&self) -> &'static str {
        match self {
            EntryOrigin::Manual => "Manual",
            EntryOrigin::CommerceOrder => "Commerce Order",
            EntryOrigin::Membership => "Membership",
            EntryOrigin::Other => "Other",
        }
    }
}

impl std::fmt::Display for EntryOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
