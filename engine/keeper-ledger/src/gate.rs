//! Authorization & lock gate
//!
//! # Invariants
//!
//! - A locked season denies every roster edit, whoever asks.
//! - Only an authenticated, unexpired actor can edit, and only rosters it
//!   manages: matched by manager id first, then by case-insensitive name for
//!   legacy rows without a stable id.
//!
//! Denials are not errors. Callers treat them as disallowed transitions and
//! return without mutating anything.

use chrono::{DateTime, Utc};

use crate::types::{Actor, KeeperLockState, Roster, RosterId};

/// Why an edit was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    SeasonLocked,
    Unauthenticated,
    UnknownRoster,
    NotOwner,
    NotCommissioner,
}

/// Edit permission check bound to one lock state, actor and instant
#[derive(Debug, Clone, Copy)]
pub struct EditGate<'a> {
    lock: &'a KeeperLockState,
    actor: &'a Actor,
    now: DateTime<Utc>,
}

impl<'a> EditGate<'a> {
    pub fn new(lock: &'a KeeperLockState, actor: &'a Actor) -> Self {
        Self::at(lock, actor, Utc::now())
    }

    pub fn at(lock: &'a KeeperLockState, actor: &'a Actor, now: DateTime<Utc>) -> Self {
        Self { lock, actor, now }
    }

    /// Check whether the actor may edit `roster_id` right now
    pub fn check(&self, rosters: &[Roster], roster_id: RosterId) -> Result<(), DenyReason> {
        if self.lock.locked {
            return Err(DenyReason::SeasonLocked);
        }
        if !self.actor.is_authenticated_at(self.now) {
            return Err(DenyReason::Unauthenticated);
        }
        let roster = rosters
            .iter()
            .find(|roster| roster.roster_id == roster_id)
            .ok_or(DenyReason::UnknownRoster)?;
        if roster_belongs_to(roster, self.actor) {
            Ok(())
        } else {
            Err(DenyReason::NotOwner)
        }
    }

    pub fn can_edit_roster(&self, rosters: &[Roster], roster_id: RosterId) -> bool {
        let decision = self.check(rosters, roster_id);
        if let Err(reason) = decision {
            tracing::debug!(roster_id, ?reason, "roster edit denied");
        }
        decision.is_ok()
    }

    /// Manual trades: either side's manager, or the commissioner
    pub fn check_manual_trade(
        &self,
        rosters: &[Roster],
        from: RosterId,
        to: RosterId,
    ) -> Result<(), DenyReason> {
        if self.lock.locked {
            return Err(DenyReason::SeasonLocked);
        }
        if !self.actor.is_authenticated_at(self.now) {
            return Err(DenyReason::Unauthenticated);
        }
        if self.actor.commissioner {
            return Ok(());
        }
        match (self.check(rosters, from), self.check(rosters, to)) {
            (Ok(()), _) | (_, Ok(())) => Ok(()),
            (Err(DenyReason::UnknownRoster), Err(DenyReason::UnknownRoster)) => {
                Err(DenyReason::UnknownRoster)
            }
            _ => Err(DenyReason::NotOwner),
        }
    }

    /// Lock flips ignore the lock itself; they only need a commissioner
    pub fn check_lock_change(&self) -> Result<(), DenyReason> {
        if !self.actor.is_authenticated_at(self.now) {
            return Err(DenyReason::Unauthenticated);
        }
        if !self.actor.commissioner {
            return Err(DenyReason::NotCommissioner);
        }
        Ok(())
    }
}

/// Whether `roster` is managed by `actor`, ignoring auth status and lock
pub fn roster_belongs_to(roster: &Roster, actor: &Actor) -> bool {
    actor.refs().iter().any(|owner| roster.has_owner(owner))
}

/// Roster managed by the actor: id match across all rosters wins over name
pub fn find_roster_for_actor(rosters: &[Roster], actor: &Actor) -> Option<RosterId> {
    actor.refs().iter().find_map(|owner| {
        rosters.iter().find(|roster| roster.has_owner(owner)).map(|roster| roster.roster_id)
    })
}

/// Convenience wrapper over [`EditGate::can_edit_roster`]
pub fn can_edit_roster(
    lock: &KeeperLockState,
    actor: &Actor,
    rosters: &[Roster],
    roster_id: RosterId,
) -> bool {
    EditGate::new(lock, actor).can_edit_roster(rosters, roster_id)
}
