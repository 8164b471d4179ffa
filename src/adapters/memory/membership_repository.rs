//! In-memory membership store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::membership::UserMembership;
use crate::ports::{MembershipRepository, StoreError};

/// In-memory `MembershipRepository`, one record per user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipRepository {
    memberships: Arc<RwLock<HashMap<UserId, UserMembership>>>,
    fail_updates: Arc<RwLock<bool>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memberships(memberships: Vec<UserMembership>) -> Self {
        let map = memberships.into_iter().map(|m| (m.user_id, m)).collect();
        Self {
            memberships: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Every stored record, ordered by user.
    pub async fn all(&self) -> Vec<UserMembership> {
        let mut all: Vec<_> = self.memberships.read().await.values().cloned().collect();
        all.sort_by_key(|m| m.user_id.value());
        all
    }

    /// Make every `update` fail.
    pub async fn fail_updates(&self, fail: bool) {
        *self.fail_updates.write().await = fail;
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<UserMembership>, StoreError> {
        Ok(self.memberships.read().await.get(&user_id).cloned())
    }

    async fn update(&self, membership: &UserMembership) -> Result<(), StoreError> {
        if *self.fail_updates.read().await {
            return Err(StoreError::write_failed(format!(
                "membership for user {} rejected",
                membership.user_id
            )));
        }
        self.memberships
            .write()
            .await
            .insert(membership.user_id, membership.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MembershipId, Timestamp};
    use crate::domain::membership::{MembershipMeta, Period};

    fn membership(user: u64, plan: u64) -> UserMembership {
        UserMembership::activate(
            UserId::new(user).unwrap(),
            MembershipId::new(plan).unwrap(),
            &MembershipMeta::new(1000, 1, Period::Month),
            Timestamp::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn update_replaces_the_users_record() {
        let repo = InMemoryMembershipRepository::with_memberships(vec![membership(1, 5)]);
        repo.update(&membership(1, 6)).await.unwrap();

        let found = repo.find_by_user(UserId::new(1).unwrap()).await.unwrap().unwrap();
        assert!(found.is_for(MembershipId::new(6).unwrap()));
        assert_eq!(repo.all().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_has_no_record() {
        let repo = InMemoryMembershipRepository::new();
        assert!(repo.find_by_user(UserId::new(9).unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_update_leaves_record_untouched() {
        let repo = InMemoryMembershipRepository::with_memberships(vec![membership(1, 5)]);
        repo.fail_updates(true).await;

        assert!(repo.update(&membership(1, 6)).await.is_err());
        let found = repo.find_by_user(UserId::new(1).unwrap()).await.unwrap().unwrap();
        assert!(found.is_for(MembershipId::new(5).unwrap()));
    }
}
