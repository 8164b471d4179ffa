//! In-memory membership subsystem.
//!
//! Plays the part of the host's membership plugin: knows plan metadata, sets
//! up membership records on purchase and moves membership-granted entries.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::enrollment::{Entry, EntryOrigin, EntryStatus};
use crate::domain::foundation::{DomainError, MembershipId, Timestamp, UserId};
use crate::domain::membership::{MembershipMeta, MembershipStatus, UserMembership};
use crate::ports::{
    EntryFilter, EntryRepository, MembershipRepository, MembershipService, StoreError,
};

/// One call to `setup_membership` that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipGrant {
    pub user_id: UserId,
    pub membership_id: MembershipId,
    pub granted_at: Timestamp,
}

/// In-memory `MembershipService`.
///
/// Buying the plan a user already holds, while it is active and unexpired,
/// extends the current term. Anything else starts a fresh term at the grant
/// time.
#[derive(Clone)]
pub struct InMemoryMembershipService {
    plans: Arc<RwLock<HashMap<MembershipId, MembershipMeta>>>,
    memberships: Arc<dyn MembershipRepository>,
    entries: Arc<dyn EntryRepository>,
    grants: Arc<RwLock<Vec<MembershipGrant>>>,
}

impl InMemoryMembershipService {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        entries: Arc<dyn EntryRepository>,
    ) -> Self {
        Self {
            plans: Arc::new(RwLock::new(HashMap::new())),
            memberships,
            entries,
            grants: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register or replace a plan's metadata.
    pub async fn define_plan(&self, membership_id: MembershipId, meta: MembershipMeta) {
        self.plans.write().await.insert(membership_id, meta);
    }

    /// Every successful setup, oldest first.
    pub async fn grants(&self) -> Vec<MembershipGrant> {
        self.grants.read().await.clone()
    }

    fn term_start(
        current: Option<&UserMembership>,
        membership_id: MembershipId,
        granted_at: Timestamp,
    ) -> Timestamp {
        match current {
            Some(m) if m.is_for(membership_id) && m.status == MembershipStatus::Active => m
                .expiration
                .filter(|exp| exp.is_after(&granted_at))
                .unwrap_or(granted_at),
            _ => granted_at,
        }
    }
}

fn move_entry(entry: &mut Entry, status: EntryStatus) -> Result<(), DomainError> {
    match status {
        EntryStatus::InProgress => entry.resume(),
        EntryStatus::Paused => entry.pause(),
        EntryStatus::Cancelled => entry.cancel(),
        EntryStatus::Completed => entry.complete(),
    }
}

#[async_trait]
impl MembershipService for InMemoryMembershipService {
    async fn setup_membership(
        &self,
        user_id: UserId,
        membership_id: MembershipId,
        granted_at: Timestamp,
    ) -> Result<(), StoreError> {
        let meta = self
            .membership_meta(membership_id)
            .await?
            .ok_or_else(|| StoreError::not_found("membership plan", membership_id))?;

        let current = self.memberships.find_by_user(user_id).await?;
        let starts_at = Self::term_start(current.as_ref(), membership_id, granted_at);

        let membership = UserMembership::activate(user_id, membership_id, &meta, starts_at)
            .map_err(|e| StoreError::write_failed(e.to_string()))?;
        self.memberships.update(&membership).await?;

        self.grants.write().await.push(MembershipGrant {
            user_id,
            membership_id,
            granted_at,
        });

        tracing::debug!(
            user_id = %user_id,
            membership_id = %membership_id,
            expiration = ?membership.expiration,
            "Membership set up"
        );
        Ok(())
    }

    async fn update_membership_entries(
        &self,
        user_id: UserId,
        status: EntryStatus,
    ) -> Result<(), StoreError> {
        let filter = EntryFilter::for_user(user_id).with_origin(EntryOrigin::Membership);

        for mut entry in self.entries.find(filter).await? {
            if entry.entry_status == status || move_entry(&mut entry, status).is_err() {
                continue;
            }
            self.entries.save(&entry).await?;
        }
        Ok(())
    }

    async fn membership_meta(
        &self,
        membership_id: MembershipId,
    ) -> Result<Option<MembershipMeta>, StoreError> {
        Ok(self.plans.read().await.get(&membership_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEntryRepository, InMemoryMembershipRepository};
    use crate::domain::foundation::CourseId;
    use crate::domain::membership::Period;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn user() -> UserId {
        UserId::new(1).unwrap()
    }

    fn plan() -> MembershipId {
        MembershipId::new(40).unwrap()
    }

    struct Fixture {
        memberships: Arc<InMemoryMembershipRepository>,
        entries: Arc<InMemoryEntryRepository>,
        service: InMemoryMembershipService,
    }

    async fn fixture() -> Fixture {
        let memberships = Arc::new(InMemoryMembershipRepository::new());
        let entries = Arc::new(InMemoryEntryRepository::new());
        let service = InMemoryMembershipService::new(memberships.clone(), entries.clone());
        service
            .define_plan(plan(), MembershipMeta::new(1500, 1, Period::Month))
            .await;
        Fixture {
            memberships,
            entries,
            service,
        }
    }

    #[tokio::test]
    async fn setup_starts_a_term_at_grant_time() {
        let f = fixture().await;

        f.service.setup_membership(user(), plan(), at(2024, 1, 10)).await.unwrap();

        let m = f.memberships.find_by_user(user()).await.unwrap().unwrap();
        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.expiration, Some(at(2024, 2, 10)));
        assert_eq!(f.service.grants().await.len(), 1);
    }

    #[tokio::test]
    async fn repeat_purchase_extends_unexpired_term() {
        let f = fixture().await;

        f.service.setup_membership(user(), plan(), at(2024, 1, 10)).await.unwrap();
        f.service.setup_membership(user(), plan(), at(2024, 1, 20)).await.unwrap();

        let m = f.memberships.find_by_user(user()).await.unwrap().unwrap();
        assert_eq!(m.expiration, Some(at(2024, 3, 10)));
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let f = fixture().await;
        let other = MembershipId::new(41).unwrap();

        let err = f.service.setup_membership(user(), other, at(2024, 1, 10)).await;

        assert!(matches!(err, Err(StoreError::NotFound { .. })));
        assert!(f.service.grants().await.is_empty());
    }

    #[tokio::test]
    async fn pausing_touches_only_membership_entries_in_progress() {
        let f = fixture().await;
        let course = CourseId::new(3).unwrap();
        let membership_entry = Entry::granted(course, user(), EntryOrigin::Membership, at(2024, 1, 1));
        let manual_entry = Entry::granted(course, user(), EntryOrigin::Manual, at(2024, 1, 1));
        let mut finished = Entry::granted(course, user(), EntryOrigin::Membership, at(2024, 1, 1));
        finished.complete().unwrap();
        for e in [&membership_entry, &manual_entry, &finished] {
            f.entries.save(e).await.unwrap();
        }

        f.service
            .update_membership_entries(user(), EntryStatus::Paused)
            .await
            .unwrap();

        let all = f.entries.all().await;
        assert_eq!(all[0].entry_status, EntryStatus::Paused);
        assert_eq!(all[1].entry_status, EntryStatus::InProgress);
        assert_eq!(all[2].entry_status, EntryStatus::Completed);
    }
}
