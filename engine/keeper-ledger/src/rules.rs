//! League rules driving eligibility, costs and budgets

use serde::{Deserialize, Serialize};

/// Draft budget every roster starts the season with
pub const DEFAULT_DRAFT_BUDGET: i64 = 200;

/// Surcharge per keep, multiplied by `years_kept + 1`
pub const DEFAULT_KEEPER_COST_STEP: u32 = 5;

/// A player kept more than this many prior seasons is ineligible
pub const DEFAULT_MAX_YEARS_KEPT: u32 = 1;

pub const DEFAULT_MAX_KEEPERS_PER_ROSTER: usize = 3;

pub const DEFAULT_MAX_TRADE_NOTE_LEN: usize = 500;

/// League rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueRules {
    pub draft_budget_base: i64,
    pub keeper_cost_step: u32,
    pub max_years_kept: u32,
    pub max_keepers_per_roster: usize,
    pub max_trade_note_len: usize,
}

impl Default for LeagueRules {
    fn default() -> Self {
        Self {
            draft_budget_base: DEFAULT_DRAFT_BUDGET,
            keeper_cost_step: DEFAULT_KEEPER_COST_STEP,
            max_years_kept: DEFAULT_MAX_YEARS_KEPT,
            max_keepers_per_roster: DEFAULT_MAX_KEEPERS_PER_ROSTER,
            max_trade_note_len: DEFAULT_MAX_TRADE_NOTE_LEN,
        }
    }
}

impl LeagueRules {
    /// Validate rule values
    pub fn validate(&self) -> Result<(), String> {
        if self.keeper_cost_step == 0 {
            return Err("keeper_cost_step must be greater than 0".to_string());
        }
        if self.max_keepers_per_roster == 0 {
            return Err("max_keepers_per_roster must be greater than 0".to_string());
        }
        if self.max_trade_note_len == 0 {
            return Err("max_trade_note_len must be greater than 0".to_string());
        }
        Ok(())
    }
}
