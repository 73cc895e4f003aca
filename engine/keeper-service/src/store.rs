//! Keeper store abstraction and wire types
//!
//! The store is the only I/O boundary of a session. [`crate::InMemoryKeeperStore`]
//! backs tests and local tooling, [`crate::HttpKeeperStore`] talks to the
//! league backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keeper_ledger::{
    KeeperLockState, ManualTrade, NewManualTrade, PlayerId, Roster, RosterId, SeasonYear,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;

/// Money columns are stored as REAL; accept `12`, `12.0` and `null`
fn de_amount<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(v) if v.is_finite() && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(Some(v.round() as u32)),
        Some(v) => Err(serde::de::Error::custom(format!("invalid amount {v}"))),
    }
}

/// Player drafted onto a roster for the season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftedPlayer {
    pub id: PlayerId,
    pub name: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub draft_cost: Option<u32>,
}

/// A roster as the league platform reports it for a season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRoster {
    pub roster_id: RosterId,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub players: Vec<DraftedPlayer>,
}

/// One persisted keeper row.
///
/// Rows with `trade_from_roster_id` set are mirrors: `roster_id` is the
/// acquiring roster and `trade_from_roster_id` the original owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedKeeper {
    pub roster_id: RosterId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub previous_cost: Option<u32>,
    #[serde(default)]
    pub years_kept: Option<u32>,
    #[serde(default)]
    pub trade_from_roster_id: Option<RosterId>,
    #[serde(default, deserialize_with = "de_amount")]
    pub trade_amount: Option<u32>,
    #[serde(default)]
    pub trade_note: Option<String>,
}

impl SavedKeeper {
    /// Mirror row whose original owner is a different roster
    pub fn traded_from(&self) -> Option<RosterId> {
        self.trade_from_roster_id.filter(|from| *from != self.roster_id)
    }
}

/// Saved keepers for a season together with its lock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedKeepers {
    #[serde(default)]
    pub keepers: Vec<SavedKeeper>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, rename = "lockedAt", alias = "locked_at")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt", alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedKeepers {
    pub fn lock_state(&self) -> KeeperLockState {
        KeeperLockState { locked: self.locked, locked_at: self.locked_at, updated_at: self.updated_at }
    }
}

/// One entry of the per-roster save payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeeperSelection {
    pub player_id: PlayerId,
    pub player_name: String,
    pub previous_cost: Option<u32>,
    pub years_kept: u32,
    pub trade_from_roster_id: Option<RosterId>,
    pub trade_amount: Option<u32>,
    pub trade_note: Option<String>,
}

impl KeeperSelection {
    /// Persisted rows for a roster.
    ///
    /// Kept non-trade records and kept mirrors are saved. The canonical side
    /// of a trade is not stored; it is rebuilt from the mirror on load.
    pub fn for_roster(roster: &Roster) -> Vec<KeeperSelection> {
        roster
            .players
            .iter()
            .filter(|p| if p.trade { p.locked && p.keep } else { p.keep })
            .map(|p| KeeperSelection {
                player_id: p.player_id.clone(),
                player_name: p.name.clone(),
                previous_cost: p.previous_cost,
                years_kept: p.years_kept,
                trade_from_roster_id: if p.trade { p.trade_roster_id } else { None },
                trade_amount: if p.trade { p.trade_amount } else { None },
                trade_note: if p.trade { p.trade_note.clone() } else { None },
            })
            .collect()
    }

    pub fn into_saved(self, roster_id: RosterId) -> SavedKeeper {
        SavedKeeper {
            roster_id,
            player_id: self.player_id,
            player_name: Some(self.player_name),
            previous_cost: self.previous_cost,
            years_kept: Some(self.years_kept),
            trade_from_roster_id: self.trade_from_roster_id,
            trade_amount: self.trade_amount,
            trade_note: self.trade_note,
        }
    }
}

/// Persistence backend for keeper seasons
#[async_trait]
pub trait KeeperStore: Send + Sync {
    /// Current rosters and drafted players for a season
    async fn season_rosters(&self, year: SeasonYear) -> Result<Vec<SeasonRoster>>;

    /// Saved keeper rows and lock state; an unknown season yields an empty set
    async fn saved_keepers(&self, year: SeasonYear) -> Result<SavedKeepers>;

    /// Replace the saved keepers of one roster
    async fn save_keepers(
        &self,
        year: SeasonYear,
        roster_id: RosterId,
        keepers: &[KeeperSelection],
    ) -> Result<()>;

    async fn manual_trades(&self, year: SeasonYear) -> Result<Vec<ManualTrade>>;

    /// Store a manual trade and return its id
    async fn create_manual_trade(&self, trade: &NewManualTrade) -> Result<i64>;

    async fn delete_manual_trade(&self, id: i64) -> Result<()>;

    async fn set_keeper_lock(&self, year: SeasonYear, locked: bool) -> Result<KeeperLockState>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_ledger::RosterPlayer;

    #[test]
    fn test_selection_keeps_plain_keepers_and_mirrors_only() {
        let mut kept = RosterPlayer::new("k", "Kept", Some(30), 0, Some(35));
        kept.keep = true;
        let mut canonical = RosterPlayer::new("c", "Canonical", Some(20), 0, Some(25));
        canonical.trade = true;
        canonical.trade_roster_id = Some(2);
        let mut mirror = RosterPlayer::new("m", "Mirror", Some(10), 1, Some(20));
        mirror.keep = true;
        mirror.trade = true;
        mirror.locked = true;
        mirror.trade_roster_id = Some(3);
        mirror.trade_amount = Some(15);
        let idle = RosterPlayer::new("i", "Idle", Some(5), 0, Some(10));

        let roster = Roster::new(1, None, None, None).with_players(vec![kept, canonical, mirror, idle]);
        let rows = KeeperSelection::for_roster(&roster);
        let ids: Vec<_> = rows.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["k", "m"]);
        assert_eq!(rows[0].trade_from_roster_id, None);
        assert_eq!(rows[1].trade_from_roster_id, Some(3));
        assert_eq!(rows[1].trade_amount, Some(15));
        assert_eq!(rows[1].years_kept, 1);
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let selection = KeeperSelection {
            player_id: "p1".into(),
            player_name: "Pat".into(),
            previous_cost: Some(10),
            years_kept: 0,
            trade_from_roster_id: Some(4),
            trade_amount: Some(5),
            trade_note: None,
        };
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["playerId"], "p1");
        assert_eq!(json["tradeFromRosterId"], 4);
    }

    #[test]
    fn test_saved_keepers_reads_backend_lock_fields() {
        let json = r#"{"keepers":[{"roster_id":2,"player_id":"p","trade_from_roster_id":2,"trade_amount":12.0}],"locked":true,"lockedAt":"2024-08-01T12:00:00Z"}"#;
        let saved: SavedKeepers = serde_json::from_str(json).unwrap();
        assert!(saved.lock_state().locked);
        assert!(saved.locked_at.is_some());
        assert_eq!(saved.keepers[0].traded_from(), None);
        assert_eq!(saved.keepers[0].trade_amount, Some(12));
    }
}
