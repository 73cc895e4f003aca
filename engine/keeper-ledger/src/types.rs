//! Core data model for a keeper season

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Season year identifier (e.g. 2024)
pub type SeasonYear = i32;

/// Stable per-season roster identifier
pub type RosterId = u32;

/// Player identifier as issued by the league platform
pub type PlayerId = String;

/// Normalised reference to the manager owning a roster.
///
/// Resolved once when rosters or actors are built so that mutation paths
/// compare typed values instead of re-normalising strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagerRef {
    /// Stable manager id (trimmed)
    ById(String),
    /// Legacy display-name match (trimmed, lower-cased)
    ByName(String),
}

impl ManagerRef {
    /// Build the refs for an optional id and name, id first.
    pub fn resolve(manager_id: Option<&str>, manager_name: Option<&str>) -> Vec<ManagerRef> {
        let mut refs = Vec::with_capacity(2);
        if let Some(id) = manager_id.map(str::trim).filter(|id| !id.is_empty()) {
            refs.push(ManagerRef::ById(id.to_string()));
        }
        if let Some(name) = manager_name.map(normalize_name).filter(|name| !name.is_empty()) {
            refs.push(ManagerRef::ByName(name));
        }
        refs
    }
}

/// Case-insensitive, whitespace-trimmed manager name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One player's keeper state on one roster for the selected season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub player_id: PlayerId,
    pub name: String,
    /// Draft cost paid at acquisition
    pub previous_cost: Option<u32>,
    /// Consecutive prior seasons already kept
    pub years_kept: u32,
    /// Derived from `previous_cost` and `years_kept`
    pub cost_to_keep: Option<u32>,
    pub keep: bool,
    pub trade: bool,
    /// Counterparty roster, meaningful only while `trade` is set
    pub trade_roster_id: Option<RosterId>,
    pub trade_amount: Option<u32>,
    pub trade_note: Option<String>,
    /// Set on mirror records placed on the acquiring roster
    pub locked: bool,
    /// `keep` value before the trade began; restored on cancel
    #[serde(skip)]
    pub prev_keep: Option<bool>,
}

impl RosterPlayer {
    /// Plain, untouched record with a derived keep cost
    pub fn new(
        player_id: impl Into<PlayerId>,
        name: impl Into<String>,
        previous_cost: Option<u32>,
        years_kept: u32,
        cost_to_keep: Option<u32>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            previous_cost,
            years_kept,
            cost_to_keep,
            keep: false,
            trade: false,
            trade_roster_id: None,
            trade_amount: None,
            trade_note: None,
            locked: false,
            prev_keep: None,
        }
    }

    /// True when this record is the mirror of a trade owned by `source`
    pub fn is_mirror_of(&self, player_id: &str, source: RosterId) -> bool {
        self.locked && self.player_id == player_id && self.trade_roster_id == Some(source)
    }

    /// Canonical side of an active trade
    pub fn is_canonical_trade(&self) -> bool {
        self.trade && !self.locked
    }

    /// Drop every keep/trade flag; used when the player is no longer eligible
    pub fn clear_selection(&mut self) {
        self.keep = false;
        self.trade = false;
        self.trade_roster_id = None;
        self.trade_amount = None;
        self.trade_note = None;
        self.locked = false;
        self.prev_keep = None;
    }
}

/// A season roster with its keeper records attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: RosterId,
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub team_name: Option<String>,
    /// Resolved identity, see [`ManagerRef::resolve`]
    pub owner: Vec<ManagerRef>,
    pub players: Vec<RosterPlayer>,
}

impl Roster {
    pub fn new(
        roster_id: RosterId,
        manager_id: Option<String>,
        manager_name: Option<String>,
        team_name: Option<String>,
    ) -> Self {
        let owner = ManagerRef::resolve(manager_id.as_deref(), manager_name.as_deref());
        Self { roster_id, manager_id, manager_name, team_name, owner, players: Vec::new() }
    }

    pub fn with_players(mut self, players: Vec<RosterPlayer>) -> Self {
        self.players = players;
        self.sort_players();
        self
    }

    /// Display label: manager name, else team name, else `Roster {id}`
    pub fn label(&self) -> String {
        self.manager_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.team_name.as_deref().filter(|name| !name.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Roster {}", self.roster_id))
    }

    /// Number of records the roster currently keeps (mirrors included)
    pub fn kept_count(&self) -> usize {
        self.players.iter().filter(|p| p.keep).count()
    }

    /// Descending `previous_cost`, unknown costs last. Stable.
    pub fn sort_players(&mut self) {
        self.players.sort_by(|a, b| b.previous_cost.unwrap_or(0).cmp(&a.previous_cost.unwrap_or(0)));
    }

    pub fn has_owner(&self, owner: &ManagerRef) -> bool {
        self.owner.contains(owner)
    }
}

/// Roster-to-roster cash transfer, independent of any player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTrade {
    pub id: i64,
    pub year: SeasonYear,
    pub from_roster_id: RosterId,
    pub to_roster_id: RosterId,
    pub amount: u32,
    #[serde(default, alias = "description")]
    pub note: Option<String>,
}

/// Validated manual trade awaiting an id from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewManualTrade {
    pub year: SeasonYear,
    pub from_roster_id: RosterId,
    pub to_roster_id: RosterId,
    pub amount: u32,
    pub note: Option<String>,
}

/// Commissioner-controlled edit lock for a season
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeeperLockState {
    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Authentication status of the acting manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// The manager driving the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub status: AuthStatus,
    /// Token expiry; an expired actor is treated as unauthenticated
    pub expires_at: Option<DateTime<Utc>>,
    pub commissioner: bool,
}

impl Actor {
    /// Actor with no credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated manager
    pub fn manager(manager_id: Option<&str>, manager_name: Option<&str>) -> Self {
        Self {
            manager_id: manager_id.map(str::to_string),
            manager_name: manager_name.map(str::to_string),
            status: AuthStatus::Authenticated,
            expires_at: None,
            commissioner: false,
        }
    }

    pub fn with_commissioner(mut self, commissioner: bool) -> Self {
        self.commissioner = commissioner;
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Authenticated and not past its expiry at `now`
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AuthStatus::Authenticated
            && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn refs(&self) -> Vec<ManagerRef> {
        ManagerRef::resolve(self.manager_id.as_deref(), self.manager_name.as_deref())
    }
}
