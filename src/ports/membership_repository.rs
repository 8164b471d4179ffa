//! Membership repository port.
//!
//! Stores the single membership record each user may hold.
//!
//! # Example
//!
//! ```ignore
//! async fn holds_plan(
//!     repo: &dyn MembershipRepository,
//!     user_id: UserId,
//!     plan: MembershipId,
//! ) -> Result<bool, StoreError> {
//!     let current = repo.find_by_user(user_id).await?;
//!     Ok(current.is_some_and(|m| m.is_for(plan)))
//! }
//! ```

use async_trait::async_trait;

use super::StoreError;
use crate::domain::foundation::UserId;
use crate::domain::membership::UserMembership;

/// Repository port for user membership records.
///
/// Implementations keep at most one record per `user_id`.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// The user's membership record, `None` if the user never had one.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<UserMembership>, StoreError>;

    /// Insert or replace the user's record.
    ///
    /// # Errors
    ///
    /// - `WriteFailed` on persistence failure
    async fn update(&self, membership: &UserMembership) -> Result<(), StoreError>;
}
