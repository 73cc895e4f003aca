//! Reconciliation orchestrator
//!
//! [`KeeperSession`] owns the working state of one selected season: the
//! reconciled rosters, manual trades and lock. Every edit is gated, applied
//! in memory as a single commit, and only then persisted for the rosters it
//! touched. Store failures never undo an in-memory edit; they are logged,
//! kept in [`KeeperSession::last_error`] and the affected rosters stay queued
//! for [`KeeperSession::retry_unsaved`].

use std::collections::BTreeSet;
use std::sync::Arc;

use keeper_ledger::types::normalize_name;
use keeper_ledger::{
    apply_edit, check_trade_links, draft_budget_summary, find_roster_for_actor, keeper_summary,
    manager_label, parse_roster_id, parse_trade_amount, parse_trade_note, roster_belongs_to,
    trade_summary, Actor, BudgetEntry, EditGate, EditOutcome, KeeperLockState,
    KeeperSummaryEntry, LeagueRules, LedgerError, ManagerRef, ManualTrade, NewManualTrade,
    Roster, RosterEdit, RosterId, SeasonLedger, SeasonYear, TradeSummaryEntry,
};
use tracing::{debug, error, info, warn};

use crate::config::KeeperServiceConfig;
use crate::http::HttpKeeperStore;
use crate::reconcile::reconcile_season;
use crate::store::{KeeperSelection, KeeperStore};
use crate::{KeeperServiceError, Result};

/// Lifecycle of the selected season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    Mutating,
    Persisting,
    /// Transient; always resolves to `Ready` with `last_error` set
    Error,
}

/// Result of a mutation entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    /// Applied in memory and stored
    Applied,
    /// Denied or not a valid transition; nothing changed
    Ignored,
    /// Applied in memory but the store call failed, see `last_error`
    Unsaved,
}

/// Raw manual trade form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualTradeInput {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub note: String,
}

/// Working state for one league season
pub struct KeeperSession {
    store: Arc<dyn KeeperStore>,
    rules: LeagueRules,
    actor: Actor,
    year: Option<SeasonYear>,
    rosters: Vec<Roster>,
    manual_trades: Vec<ManualTrade>,
    lock: KeeperLockState,
    selected_roster_id: Option<RosterId>,
    phase: SessionPhase,
    last_error: Option<String>,
    unsaved: BTreeSet<RosterId>,
}

impl KeeperSession {
    pub fn new(store: Arc<dyn KeeperStore>, rules: LeagueRules) -> Self {
        Self {
            store,
            rules,
            actor: Actor::anonymous(),
            year: None,
            rosters: Vec::new(),
            manual_trades: Vec::new(),
            lock: KeeperLockState::default(),
            selected_roster_id: None,
            phase: SessionPhase::Idle,
            last_error: None,
            unsaved: BTreeSet::new(),
        }
    }

    /// Session talking to the league API described by `config`
    pub fn connect(config: &KeeperServiceConfig) -> Result<Self> {
        config.validate()?;
        let store = HttpKeeperStore::new(config.api.clone())?;
        Ok(Self::new(Arc::new(store), config.rules.clone()))
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn year(&self) -> Option<SeasonYear> {
        self.year
    }

    pub fn rules(&self) -> &LeagueRules {
        &self.rules
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn rosters(&self) -> &[Roster] {
        &self.rosters
    }

    pub fn roster(&self, roster_id: RosterId) -> Option<&Roster> {
        self.rosters.iter().find(|roster| roster.roster_id == roster_id)
    }

    pub fn manual_trades(&self) -> &[ManualTrade] {
        &self.manual_trades
    }

    pub fn lock_state(&self) -> &KeeperLockState {
        &self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock.locked
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Rosters whose last save failed
    pub fn unsaved_rosters(&self) -> Vec<RosterId> {
        self.unsaved.iter().copied().collect()
    }

    pub fn selected_roster_id(&self) -> Option<RosterId> {
        self.selected_roster_id
    }

    pub fn selected_roster(&self) -> Option<&Roster> {
        self.selected_roster_id.and_then(|roster_id| self.roster(roster_id))
    }

    /// Index of a player's editable record on a roster, mirrors last
    pub fn find_player(&self, roster_id: RosterId, player_id: &str) -> Option<usize> {
        let players = &self.roster(roster_id)?.players;
        players
            .iter()
            .position(|p| p.player_id == player_id && !p.locked)
            .or_else(|| players.iter().position(|p| p.player_id == player_id))
    }

    fn gate(&self) -> EditGate<'_> {
        EditGate::new(&self.lock, &self.actor)
    }

    pub fn can_edit_roster(&self, roster_id: RosterId) -> bool {
        self.gate().can_edit_roster(&self.rosters, roster_id)
    }

    pub fn manager_label(&self, roster_id: RosterId) -> String {
        manager_label(&self.rosters, roster_id)
    }

    pub fn keeper_summary(&self) -> Vec<KeeperSummaryEntry> {
        keeper_summary(&self.rosters)
    }

    pub fn trade_summary(&self) -> Vec<TradeSummaryEntry> {
        trade_summary(self.year, &self.rosters, &self.manual_trades)
    }

    pub fn draft_budget_summary(&self) -> Vec<BudgetEntry> {
        draft_budget_summary(&self.rosters, &self.trade_summary(), self.rules.draft_budget_base)
    }

    pub fn ledger(&self) -> SeasonLedger {
        SeasonLedger::derive(
            self.year,
            &self.rosters,
            &self.manual_trades,
            self.rules.draft_budget_base,
        )
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "session phase");
            self.phase = next;
        }
    }

    fn fail(&mut self, message: String) {
        self.last_error = Some(message);
        self.transition(SessionPhase::Error);
        self.transition(SessionPhase::Ready);
    }

    /// Switch to `year`, discarding all in-memory state, and load it.
    ///
    /// Load failures leave an empty roster set with `last_error` set; the
    /// session still ends up `Ready`.
    pub async fn select_season(&mut self, year: Option<SeasonYear>) {
        let previous_id = self.selected_roster_id;
        let previous_manager = self.selected_roster().and_then(|r| r.manager_name.clone());

        self.year = year;
        self.rosters.clear();
        self.manual_trades.clear();
        self.lock = KeeperLockState::default();
        self.selected_roster_id = None;
        self.last_error = None;
        self.unsaved.clear();

        let Some(year) = year else {
            self.transition(SessionPhase::Idle);
            return;
        };

        self.transition(SessionPhase::Loading);
        match self.load(year).await {
            Ok(()) => {
                info!(
                    year,
                    rosters = self.rosters.len(),
                    manual_trades = self.manual_trades.len(),
                    locked = self.lock.locked,
                    "season loaded"
                );
                self.transition(SessionPhase::Ready);
            }
            Err(e) => {
                error!(year, error = %e, "failed to load season");
                self.rosters.clear();
                self.fail(format!("Failed to load keepers for {}: {}", year, e));
            }
        }

        self.selected_roster_id = self.preserve_selection(previous_id, previous_manager.as_deref());
    }

    /// Reload the current season, keeping the selection where possible
    pub async fn reload(&mut self) {
        self.select_season(self.year).await;
    }

    async fn load(&mut self, year: SeasonYear) -> Result<()> {
        let store = Arc::clone(&self.store);
        let (current, saved, prior, trades) = tokio::join!(
            store.season_rosters(year),
            store.saved_keepers(year),
            store.saved_keepers(year - 1),
            store.manual_trades(year),
        );

        match trades {
            Ok(trades) => self.manual_trades = trades,
            Err(e) => {
                warn!(year, error = %e, "failed to load manual trades");
                self.last_error = Some(format!("Failed to load trades for {}: {}", year, e));
            }
        }

        let (current, saved, prior) = (current?, saved?, prior?);
        self.lock = saved.lock_state();
        self.rosters = reconcile_season(&current, &saved.keepers, &prior.keepers, &self.rules);

        for violation in check_trade_links(&self.rosters, &self.rules) {
            warn!(year, ?violation, "trade link violation in saved keepers");
        }
        Ok(())
    }

    fn preserve_selection(
        &self,
        previous_id: Option<RosterId>,
        previous_manager: Option<&str>,
    ) -> Option<RosterId> {
        if let Some(roster_id) = previous_id.filter(|id| self.roster(*id).is_some()) {
            return Some(roster_id);
        }

        let by_name = previous_manager
            .map(normalize_name)
            .filter(|name| !name.is_empty())
            .map(ManagerRef::ByName)
            .and_then(|owner| self.rosters.iter().find(|r| r.has_owner(&owner)))
            .map(|r| r.roster_id);
        if by_name.is_some() {
            return by_name;
        }

        if self.actor.is_authenticated() {
            if let Some(roster_id) = find_roster_for_actor(&self.rosters, &self.actor) {
                return Some(roster_id);
            }
        }

        self.rosters.first().map(|r| r.roster_id)
    }

    /// Select a roster for display; unknown ids are ignored
    pub fn select_roster(&mut self, roster_id: RosterId) -> bool {
        if self.roster(roster_id).is_none() {
            return false;
        }
        self.selected_roster_id = Some(roster_id);
        true
    }

    /// Replace the acting manager and move the selection to one of its rosters
    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = actor;
        if self.rosters.is_empty() {
            return;
        }

        let owned = if self.actor.is_authenticated() {
            self.selected_roster()
                .filter(|roster| roster_belongs_to(roster, &self.actor))
                .map(|roster| roster.roster_id)
                .or_else(|| find_roster_for_actor(&self.rosters, &self.actor))
        } else {
            None
        };

        self.selected_roster_id = owned
            .or_else(|| self.selected_roster().map(|roster| roster.roster_id))
            .or_else(|| self.rosters.first().map(|roster| roster.roster_id));
    }

    pub async fn toggle_keep(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
    ) -> Result<EditStatus> {
        self.edit(roster_id, player_index, RosterEdit::ToggleKeep).await
    }

    /// Begin a trade with the first other roster, or cancel an active one
    pub async fn toggle_trade(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
    ) -> Result<EditStatus> {
        self.edit(roster_id, player_index, RosterEdit::ToggleTrade).await
    }

    pub async fn begin_trade(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
        counterparty: RosterId,
    ) -> Result<EditStatus> {
        let edit = RosterEdit::BeginTrade { counterparty: Some(counterparty) };
        self.edit(roster_id, player_index, edit).await
    }

    pub async fn set_trade_counterparty(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
        value: &str,
    ) -> Result<EditStatus> {
        let counterparty = parse_roster_id(value)?;
        self.edit(roster_id, player_index, RosterEdit::SetCounterparty(counterparty)).await
    }

    pub async fn set_trade_amount(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
        value: &str,
    ) -> Result<EditStatus> {
        let amount = parse_trade_amount(value)?;
        self.edit(roster_id, player_index, RosterEdit::SetAmount(amount)).await
    }

    pub async fn set_trade_note(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
        value: &str,
    ) -> Result<EditStatus> {
        let note = parse_trade_note(value, self.rules.max_trade_note_len)?;
        self.edit(roster_id, player_index, RosterEdit::SetNote(note)).await
    }

    async fn edit(
        &mut self,
        roster_id: RosterId,
        player_index: usize,
        edit: RosterEdit,
    ) -> Result<EditStatus> {
        if !self.can_edit_roster(roster_id) {
            return Ok(EditStatus::Ignored);
        }

        self.transition(SessionPhase::Mutating);
        let commit = match apply_edit(&self.rosters, roster_id, player_index, edit, &self.rules) {
            Ok(EditOutcome::Applied(commit)) => commit,
            Ok(EditOutcome::Rejected(reason)) => {
                debug!(roster_id, player_index, ?reason, "edit rejected");
                self.transition(SessionPhase::Ready);
                return Ok(EditStatus::Ignored);
            }
            Err(e) => {
                self.transition(SessionPhase::Ready);
                return Err(e.into());
            }
        };

        self.rosters = commit.rosters;
        Ok(self.persist(&commit.affected).await)
    }

    /// Save the given rosters one after another
    async fn persist(&mut self, roster_ids: &[RosterId]) -> EditStatus {
        let Some(year) = self.year else {
            self.transition(SessionPhase::Ready);
            return EditStatus::Unsaved;
        };

        self.transition(SessionPhase::Persisting);
        let mut failures = Vec::new();
        for &roster_id in roster_ids {
            let Some(roster) = self.roster(roster_id) else {
                continue;
            };
            let selections = KeeperSelection::for_roster(roster);
            match self.store.save_keepers(year, roster_id, &selections).await {
                Ok(()) => {
                    self.unsaved.remove(&roster_id);
                }
                Err(e) => {
                    error!(year, roster_id, error = %e, "failed to save keepers");
                    self.unsaved.insert(roster_id);
                    failures.push(format!("roster {}: {}", roster_id, e));
                }
            }
        }

        if failures.is_empty() {
            debug!(year, rosters = ?roster_ids, "keepers persisted");
            self.transition(SessionPhase::Ready);
            EditStatus::Applied
        } else {
            self.fail(format!("Failed to save keepers ({})", failures.join("; ")));
            EditStatus::Unsaved
        }
    }

    /// Save every roster whose last save failed
    pub async fn retry_unsaved(&mut self) -> EditStatus {
        if self.unsaved.is_empty() || self.lock.locked {
            return EditStatus::Ignored;
        }
        let pending = self.unsaved_rosters();
        info!(rosters = ?pending, "retrying keeper saves");
        self.persist(&pending).await
    }

    /// Validate and store a manual cash trade
    pub async fn add_manual_trade(&mut self, input: &ManualTradeInput) -> Result<EditStatus> {
        let year = self.year.ok_or(KeeperServiceError::NoSeasonSelected)?;
        let from = parse_roster_id(&input.from)?;
        let to = parse_roster_id(&input.to)?;
        let amount = parse_trade_amount(&input.amount)?
            .ok_or_else(|| LedgerError::InvalidAmount { value: input.amount.clone() })?;
        if from == to {
            return Err(LedgerError::SameRosterManualTrade { roster_id: from }.into());
        }
        let note = parse_trade_note(&input.note, self.rules.max_trade_note_len)?;
        if let Some(roster_id) = [from, to].into_iter().find(|id| self.roster(*id).is_none()) {
            return Err(LedgerError::UnknownRoster { roster_id }.into());
        }

        if let Err(reason) = self.gate().check_manual_trade(&self.rosters, from, to) {
            debug!(from, to, ?reason, "manual trade denied");
            return Ok(EditStatus::Ignored);
        }

        let trade = NewManualTrade { year, from_roster_id: from, to_roster_id: to, amount, note };
        self.transition(SessionPhase::Persisting);
        match self.store.create_manual_trade(&trade).await {
            Ok(id) => {
                info!(year, id, from, to, amount, "manual trade added");
                self.manual_trades.push(ManualTrade {
                    id,
                    year,
                    from_roster_id: from,
                    to_roster_id: to,
                    amount,
                    note: trade.note,
                });
                self.transition(SessionPhase::Ready);
                Ok(EditStatus::Applied)
            }
            Err(e) => {
                error!(year, from, to, error = %e, "failed to add manual trade");
                self.fail(format!("Failed to add trade: {}", e));
                Ok(EditStatus::Unsaved)
            }
        }
    }

    pub async fn delete_manual_trade(&mut self, id: i64) -> Result<EditStatus> {
        let Some(trade) = self.manual_trades.iter().find(|t| t.id == id).cloned() else {
            return Ok(EditStatus::Ignored);
        };
        if let Err(reason) =
            self.gate().check_manual_trade(&self.rosters, trade.from_roster_id, trade.to_roster_id)
        {
            debug!(id, ?reason, "manual trade delete denied");
            return Ok(EditStatus::Ignored);
        }

        self.manual_trades.retain(|t| t.id != id);
        self.transition(SessionPhase::Persisting);
        match self.store.delete_manual_trade(id).await {
            Ok(()) => {
                info!(id, year = trade.year, "manual trade deleted");
                self.transition(SessionPhase::Ready);
                Ok(EditStatus::Applied)
            }
            Err(e) => {
                error!(id, error = %e, "failed to delete manual trade");
                self.fail(format!("Failed to delete trade {}: {}", id, e));
                Ok(EditStatus::Unsaved)
            }
        }
    }

    /// Commissioner-only lock flip; the season is reloaded afterwards
    pub async fn set_keeper_lock(&mut self, locked: bool) -> Result<EditStatus> {
        let year = self.year.ok_or(KeeperServiceError::NoSeasonSelected)?;
        if let Err(reason) = self.gate().check_lock_change() {
            debug!(year, ?reason, "lock change denied");
            return Ok(EditStatus::Ignored);
        }

        self.transition(SessionPhase::Persisting);
        match self.store.set_keeper_lock(year, locked).await {
            Ok(lock) => {
                info!(year, locked = lock.locked, "keeper lock updated");
                self.lock = lock;
                self.select_season(Some(year)).await;
                Ok(EditStatus::Applied)
            }
            Err(e) => {
                error!(year, locked, error = %e, "failed to update keeper lock");
                self.fail(format!("Failed to update keeper lock: {}", e));
                Ok(EditStatus::Unsaved)
            }
        }
    }
}
