//! Entry repository port.
//!
//! Persists course entries. Reconciliation reads a user's entries, decides,
//! then saves; callers serialize that sequence per user.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::enrollment::{Entry, EntryOrigin};
use crate::domain::foundation::{OrderId, UserId};

/// Entry query. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub user_id: Option<UserId>,
    pub payment_id: Option<OrderId>,
    pub entry_origin: Option<EntryOrigin>,
}

impl EntryFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Entries a given order created for its customer.
    pub fn for_order(user_id: UserId, order_id: OrderId) -> Self {
        Self {
            user_id: Some(user_id),
            payment_id: Some(order_id),
            entry_origin: Some(EntryOrigin::CommerceOrder),
        }
    }

    pub fn with_origin(mut self, origin: EntryOrigin) -> Self {
        self.entry_origin = Some(origin);
        self
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.user_id.map_or(true, |id| entry.user_id == id)
            && self.payment_id.map_or(true, |id| entry.payment_id == Some(id))
            && self.entry_origin.map_or(true, |origin| entry.entry_origin == origin)
    }
}

/// Repository port for course entries.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Entries matching `filter`, oldest first.
    async fn find(&self, filter: EntryFilter) -> Result<Vec<Entry>, StoreError>;

    /// Insert or replace the entry with the same id.
    ///
    /// # Errors
    ///
    /// - `WriteFailed` on persistence failure
    async fn save(&self, entry: &Entry) -> Result<(), StoreError>;
}
