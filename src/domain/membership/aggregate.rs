//! User membership aggregate.
//!
//! The record of which membership plan a user currently holds. Each user has
//! at most one. Purchasing a plan replaces the record; cancelling an order
//! shortens or ends it.
//!
//! # Design Decisions
//!
//! - **One per user**: keyed by `user_id` in every store
//! - **Null expiration**: one-time plans never expire on their own
//! - **Recalculated, not recreated**: cancellation retracts the term from the
//!   current expiration instead of rebuilding the record

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::expiration::{shift, Direction, Period};
use super::{MembershipMeta, MembershipStatus};
use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipId, StateMachine, Timestamp, UserId,
};

/// A user's membership record.
///
/// # Invariants
///
/// - `user_id` is unique across records
/// - `expiration` is `None` exactly for one-time plans at setup time
/// - Status transitions follow `MembershipStatus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMembership {
    pub user_id: UserId,

    /// Plan this record grants.
    pub membership_id: MembershipId,

    pub status: MembershipStatus,

    /// End of access; `None` means non-expiring.
    pub expiration: Option<Timestamp>,

    /// Term length captured from the plan at setup.
    pub duration: u32,
    pub period: Period,
}

/// What a term retraction did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retraction {
    /// Expiration moved back; access continues until the new date.
    Shortened { expiration: Timestamp },

    /// Expiration moved back onto the reference day; membership expired.
    ExpiredToday { expiration: Timestamp },

    /// Non-expiring plan; membership expired outright.
    ExpiredOnetime,
}

impl UserMembership {
    /// Start an active membership whose term begins at `starts_at`.
    ///
    /// # Errors
    ///
    /// Returns `ExpirationOutOfRange` if the term end is not representable.
    pub fn activate(
        user_id: UserId,
        membership_id: MembershipId,
        meta: &MembershipMeta,
        starts_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let expiration = meta
            .term_end(starts_at)
            .map_err(|e| DomainError::new(ErrorCode::ExpirationOutOfRange, e.to_string()))?;

        Ok(Self {
            user_id,
            membership_id,
            status: MembershipStatus::Active,
            expiration,
            duration: meta.duration,
            period: meta.period,
        })
    }

    /// True if this record holds the given plan.
    pub fn is_for(&self, membership_id: MembershipId) -> bool {
        self.membership_id == membership_id
    }

    /// Access is granted while active and not past the expiration.
    pub fn has_access(&self, at: Timestamp) -> bool {
        self.status.has_access() && self.expiration.map_or(true, |exp| !exp.is_before(&at))
    }

    /// Remove one plan term from the membership.
    ///
    /// With an expiration, the term is subtracted from it; if the result falls
    /// on the same calendar day as `today` (observed at `offset`) the whole
    /// remaining term has been cancelled and the membership expires. Without
    /// an expiration the membership expires immediately.
    ///
    /// An already expired membership still loses the term and stays expired.
    ///
    /// # Errors
    ///
    /// Returns `ExpirationOutOfRange` for unrepresentable dates.
    pub fn retract_term(
        &mut self,
        meta: &MembershipMeta,
        today: Timestamp,
        offset: FixedOffset,
    ) -> Result<Retraction, DomainError> {
        let Some(current) = self.expiration else {
            return self.expire_onetime();
        };

        let expiration = shift(current, meta.duration, meta.period, Direction::Retract)
            .map_err(|e| DomainError::new(ErrorCode::ExpirationOutOfRange, e.to_string()))?;

        if expiration.same_calendar_day(&today, offset) {
            self.ensure_expired()?;
            self.expiration = Some(expiration);
            return Ok(Retraction::ExpiredToday { expiration });
        }

        self.expiration = Some(expiration);
        Ok(Retraction::Shortened { expiration })
    }

    /// End a non-expiring membership. An expired record stays expired.
    pub fn expire_onetime(&mut self) -> Result<Retraction, DomainError> {
        self.ensure_expired()?;
        Ok(Retraction::ExpiredOnetime)
    }

    fn ensure_expired(&mut self) -> Result<(), DomainError> {
        if self.status == MembershipStatus::Expired {
            return Ok(());
        }
        self.expire()
    }

    /// Mark the membership as expired.
    ///
    /// # Errors
    ///
    /// Returns error if the membership is already expired.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition_to(MembershipStatus::Expired)
    }

    /// Suspend the membership.
    ///
    /// # Errors
    ///
    /// Returns error unless the membership is active.
    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.transition_to(MembershipStatus::Paused)
    }

    /// Lift a pause.
    ///
    /// # Errors
    ///
    /// Returns error unless the membership is paused.
    pub fn resume(&mut self) -> Result<(), DomainError> {
        if self.status != MembershipStatus::Paused {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot resume membership in {:?} state", self.status),
            ));
        }
        self.transition_to(MembershipStatus::Active)
    }

    fn transition_to(&mut self, target: MembershipStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|e| {
            e.with_detail("user_id", self.user_id.to_string())
                .with_detail("membership_id", self.membership_id.to_string())
        })?;
        Ok(())
    }
}
