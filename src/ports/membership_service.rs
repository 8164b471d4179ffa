//! Membership service port.
//!
//! Operations owned by the membership subsystem that reconciliation triggers
//! but does not implement itself.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::enrollment::EntryStatus;
use crate::domain::foundation::{MembershipId, Timestamp, UserId};
use crate::domain::membership::MembershipMeta;

#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Create or replace the user's membership record for a purchased plan.
    ///
    /// `granted_at` is when the purchase became effective. Returns
    /// `NotFound` if the plan has no metadata.
    async fn setup_membership(
        &self,
        user_id: UserId,
        membership_id: MembershipId,
        granted_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Move every entry the user holds through membership access to `status`.
    async fn update_membership_entries(
        &self,
        user_id: UserId,
        status: EntryStatus,
    ) -> Result<(), StoreError>;

    /// Pricing and term of a plan, `None` if the plan is unknown.
    async fn membership_meta(
        &self,
        membership_id: MembershipId,
    ) -> Result<Option<MembershipMeta>, StoreError>;
}
