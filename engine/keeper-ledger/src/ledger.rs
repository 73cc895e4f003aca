//! Ledger aggregator: keeper, trade and draft budget views
//!
//! All views are recomputed from the roster set on every read; nothing here
//! is cached.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ManualTrade, Roster, RosterId, SeasonYear};

/// A kept player with its cost, if known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeptPlayer {
    pub name: String,
    pub cost_to_keep: Option<u32>,
}

impl fmt::Display for KeptPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cost_to_keep {
            Some(cost) => write!(f, "{} (${})", self.name, cost),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Kept players for one roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeeperSummaryEntry {
    pub roster_id: RosterId,
    pub team_name: String,
    pub players: Vec<KeptPlayer>,
}

/// One cash movement between two rosters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSummaryEntry {
    pub year: Option<SeasonYear>,
    pub from_roster_id: RosterId,
    pub to_roster_id: RosterId,
    /// Resolved manager label of `from_roster_id`
    pub from: String,
    pub to: String,
    /// Player whose keeper rights moved; `None` for manual trades
    pub player: Option<String>,
    pub amount: u32,
    pub note: String,
    pub manual: bool,
}

/// Net draft budget for one roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub roster_id: RosterId,
    pub manager: String,
    pub amount: i64,
}

/// Case-insensitive label order, raw label as tiebreak
fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Label for a roster id, falling back to `Roster {id}` for unknown ids
pub fn manager_label(rosters: &[Roster], roster_id: RosterId) -> String {
    rosters
        .iter()
        .find(|roster| roster.roster_id == roster_id)
        .map(Roster::label)
        .unwrap_or_else(|| format!("Roster {}", roster_id))
}

/// Kept players per roster, rosters without keepers omitted, sorted by label
pub fn keeper_summary(rosters: &[Roster]) -> Vec<KeeperSummaryEntry> {
    let mut summary: Vec<_> = rosters
        .iter()
        .map(|roster| KeeperSummaryEntry {
            roster_id: roster.roster_id,
            team_name: roster.label(),
            players: roster
                .players
                .iter()
                .filter(|p| p.keep)
                .map(|p| KeptPlayer { name: p.name.clone(), cost_to_keep: p.cost_to_keep })
                .collect(),
        })
        .filter(|entry| !entry.players.is_empty())
        .collect();
    summary.sort_by(|a, b| compare_labels(&a.team_name, &b.team_name));
    summary
}

/// Manual trades followed by keeper trades.
///
/// Keeper trades are read from the mirror side: `from` is the original owner
/// and `to` the acquiring roster. Trades without an amount carry no money and
/// are left out.
pub fn trade_summary(
    year: Option<SeasonYear>,
    rosters: &[Roster],
    manual_trades: &[ManualTrade],
) -> Vec<TradeSummaryEntry> {
    let manual = manual_trades.iter().map(|trade| TradeSummaryEntry {
        year: Some(trade.year),
        from_roster_id: trade.from_roster_id,
        to_roster_id: trade.to_roster_id,
        from: manager_label(rosters, trade.from_roster_id),
        to: manager_label(rosters, trade.to_roster_id),
        player: None,
        amount: trade.amount,
        note: trade.note.clone().unwrap_or_default(),
        manual: true,
    });

    let keeper = rosters.iter().flat_map(|roster| {
        roster.players.iter().filter_map(move |p| {
            let owner = p.trade_roster_id.filter(|_| p.trade && p.locked)?;
            let amount = p.trade_amount.filter(|amount| *amount > 0)?;
            Some(TradeSummaryEntry {
                year,
                from_roster_id: owner,
                to_roster_id: roster.roster_id,
                from: manager_label(rosters, owner),
                to: roster.label(),
                player: Some(p.name.clone()),
                amount,
                note: p.trade_note.clone().unwrap_or_default(),
                manual: false,
            })
        })
    });

    manual.chain(keeper).collect()
}

/// Net draft budgets.
///
/// Manual trades move money `from` -> `to`. Keeper trades run the other way:
/// the acquiring roster (`to`) pays the original owner (`from`).
pub fn draft_budget_summary(
    rosters: &[Roster],
    trades: &[TradeSummaryEntry],
    base: i64,
) -> Vec<BudgetEntry> {
    let mut budgets: BTreeMap<RosterId, i64> =
        rosters.iter().map(|roster| (roster.roster_id, base)).collect();

    for trade in trades {
        let amount = i64::from(trade.amount);
        let (payer, payee) = if trade.manual {
            (trade.from_roster_id, trade.to_roster_id)
        } else {
            (trade.to_roster_id, trade.from_roster_id)
        };
        *budgets.entry(payer).or_insert(base) -= amount;
        *budgets.entry(payee).or_insert(base) += amount;
    }

    let mut summary: Vec<_> = budgets
        .into_iter()
        .map(|(roster_id, amount)| BudgetEntry {
            roster_id,
            manager: manager_label(rosters, roster_id),
            amount,
        })
        .collect();
    summary.sort_by(|a, b| {
        compare_labels(&a.manager, &b.manager).then(a.roster_id.cmp(&b.roster_id))
    });
    summary
}

/// All three views for one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLedger {
    pub keepers: Vec<KeeperSummaryEntry>,
    pub trades: Vec<TradeSummaryEntry>,
    pub budgets: Vec<BudgetEntry>,
}

impl SeasonLedger {
    pub fn derive(
        year: Option<SeasonYear>,
        rosters: &[Roster],
        manual_trades: &[ManualTrade],
        budget_base: i64,
    ) -> Self {
        let trades = trade_summary(year, rosters, manual_trades);
        let budgets = draft_budget_summary(rosters, &trades, budget_base);
        Self { keepers: keeper_summary(rosters), trades, budgets }
    }
}
