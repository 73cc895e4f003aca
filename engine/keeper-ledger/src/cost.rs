//! Keeper eligibility and cost calculator
//!
//! Keeping a player costs its previous draft price plus an escalating
//! surcharge of `step * (years_kept + 1)`. Once a player has been kept more
//! than `max_years_kept` consecutive seasons it can no longer be kept or
//! traded and has no cost.

use crate::rules::LeagueRules;

impl LeagueRules {
    /// Whether a player with this keep history may be kept or traded
    pub fn is_eligible(&self, years_kept: u32) -> bool {
        years_kept <= self.max_years_kept
    }

    /// Cost to keep under these rules; `None` when undetermined or ineligible
    pub fn cost_to_keep(&self, previous_cost: Option<u32>, years_kept: u32) -> Option<u32> {
        if !self.is_eligible(years_kept) {
            return None;
        }
        let surcharge = self.keeper_cost_step.checked_mul(years_kept.checked_add(1)?)?;
        previous_cost?.checked_add(surcharge)
    }
}

/// Cost to keep under the default league rules
pub fn cost_to_keep(previous_cost: Option<u32>, years_kept: u32) -> Option<u32> {
    LeagueRules::default().cost_to_keep(previous_cost, years_kept)
}

/// Eligibility under the default league rules
pub fn is_eligible(years_kept: u32) -> bool {
    LeagueRules::default().is_eligible(years_kept)
}
