//! In-memory keeper store for tests and offline tooling

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use keeper_ledger::{KeeperLockState, ManualTrade, NewManualTrade, RosterId, SeasonYear};
use tokio::sync::Mutex;

use crate::store::{KeeperSelection, KeeperStore, SavedKeeper, SavedKeepers, SeasonRoster};
use crate::{KeeperServiceError, Result};

/// Store operation, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SeasonRosters,
    SavedKeepers,
    SaveKeepers,
    ManualTrades,
    CreateManualTrade,
    DeleteManualTrade,
    SetKeeperLock,
}

#[derive(Debug, Default)]
struct StoreState {
    rosters: HashMap<SeasonYear, Vec<SeasonRoster>>,
    keepers: HashMap<SeasonYear, Vec<SavedKeeper>>,
    locks: HashMap<SeasonYear, KeeperLockState>,
    trades: Vec<ManualTrade>,
    next_trade_id: i64,
    save_log: Vec<(SeasonYear, RosterId)>,
    failing: HashSet<StoreOp>,
}

/// Keeper store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeeperStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryKeeperStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_season(&self, year: SeasonYear, rosters: Vec<SeasonRoster>) {
        self.state.lock().await.rosters.insert(year, rosters);
    }

    pub async fn seed_keepers(&self, year: SeasonYear, keepers: Vec<SavedKeeper>) {
        self.state.lock().await.keepers.insert(year, keepers);
    }

    pub async fn seed_lock(&self, year: SeasonYear, lock: KeeperLockState) {
        self.state.lock().await.locks.insert(year, lock);
    }

    pub async fn seed_manual_trade(&self, trade: NewManualTrade) -> i64 {
        let mut state = self.state.lock().await;
        insert_trade(&mut state, &trade)
    }

    /// Make every later call of `op` fail until [`Self::recover`]
    pub async fn fail(&self, op: StoreOp) {
        self.state.lock().await.failing.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.state.lock().await.failing.remove(&op);
    }

    pub async fn saved_rows(&self, year: SeasonYear) -> Vec<SavedKeeper> {
        self.state.lock().await.keepers.get(&year).cloned().unwrap_or_default()
    }

    /// Every successful `save_keepers` call, in order
    pub async fn save_log(&self) -> Vec<(SeasonYear, RosterId)> {
        self.state.lock().await.save_log.clone()
    }
}

fn insert_trade(state: &mut StoreState, trade: &NewManualTrade) -> i64 {
    state.next_trade_id += 1;
    let id = state.next_trade_id;
    state.trades.push(ManualTrade {
        id,
        year: trade.year,
        from_roster_id: trade.from_roster_id,
        to_roster_id: trade.to_roster_id,
        amount: trade.amount,
        note: trade.note.clone(),
    });
    id
}

fn check(state: &StoreState, op: StoreOp) -> Result<()> {
    if state.failing.contains(&op) {
        return Err(KeeperServiceError::unavailable(format!("{op:?}")));
    }
    Ok(())
}

#[async_trait]
impl KeeperStore for InMemoryKeeperStore {
    async fn season_rosters(&self, year: SeasonYear) -> Result<Vec<SeasonRoster>> {
        let state = self.state.lock().await;
        check(&state, StoreOp::SeasonRosters)?;
        Ok(state.rosters.get(&year).cloned().unwrap_or_default())
    }

    async fn saved_keepers(&self, year: SeasonYear) -> Result<SavedKeepers> {
        let state = self.state.lock().await;
        check(&state, StoreOp::SavedKeepers)?;
        let lock = state.locks.get(&year).cloned().unwrap_or_default();
        Ok(SavedKeepers {
            keepers: state.keepers.get(&year).cloned().unwrap_or_default(),
            locked: lock.locked,
            locked_at: lock.locked_at,
            updated_at: lock.updated_at,
        })
    }

    async fn save_keepers(
        &self,
        year: SeasonYear,
        roster_id: RosterId,
        keepers: &[KeeperSelection],
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        check(&state, StoreOp::SaveKeepers)?;
        if state.locks.get(&year).is_some_and(|lock| lock.locked) {
            return Err(KeeperServiceError::Api {
                status: 403,
                message: "Keeper selections are locked for this season".to_string(),
            });
        }

        let rows = state.keepers.entry(year).or_default();
        rows.retain(|row| row.roster_id != roster_id);
        rows.extend(keepers.iter().cloned().map(|k| k.into_saved(roster_id)));
        rows.sort_by_key(|row| row.roster_id);
        state.save_log.push((year, roster_id));

        tracing::debug!(year, roster_id, count = keepers.len(), "keepers saved");
        Ok(())
    }

    async fn manual_trades(&self, year: SeasonYear) -> Result<Vec<ManualTrade>> {
        let state = self.state.lock().await;
        check(&state, StoreOp::ManualTrades)?;
        Ok(state.trades.iter().filter(|t| t.year == year).cloned().collect())
    }

    async fn create_manual_trade(&self, trade: &NewManualTrade) -> Result<i64> {
        let mut state = self.state.lock().await;
        check(&state, StoreOp::CreateManualTrade)?;
        Ok(insert_trade(&mut state, trade))
    }

    async fn delete_manual_trade(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        check(&state, StoreOp::DeleteManualTrade)?;
        let before = state.trades.len();
        state.trades.retain(|t| t.id != id);
        if state.trades.len() == before {
            return Err(KeeperServiceError::Api {
                status: 404,
                message: format!("Trade {id} not found"),
            });
        }
        Ok(())
    }

    async fn set_keeper_lock(&self, year: SeasonYear, locked: bool) -> Result<KeeperLockState> {
        let mut state = self.state.lock().await;
        check(&state, StoreOp::SetKeeperLock)?;
        let now = Utc::now();
        let lock = state.locks.entry(year).or_default();
        lock.locked = locked;
        if locked {
            lock.locked_at = Some(now);
        }
        lock.updated_at = Some(now);
        Ok(lock.clone())
    }
}
