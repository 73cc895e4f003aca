//! Keeper ledger - keeper eligibility, mirrored keeper trades and draft budgets
//!
//! This crate holds the pure bookkeeping for a league's keeper season. It does
//! no I/O; the `keeper-service` crate loads rosters, drives edits through this
//! crate and persists the results.
//!
//! ## Components
//!
//! - **cost**: eligibility and escalating keep cost
//! - **gate**: lock and manager authorization checks
//! - **sync**: canonical/mirror trade records, edited as one plan
//! - **ledger**: keeper, trade and draft budget views

pub mod cost;
pub mod error;
pub mod gate;
pub mod input;
pub mod ledger;
pub mod rules;
pub mod sync;
pub mod types;

pub use cost::{cost_to_keep, is_eligible};
pub use error::{LedgerError, Result};
pub use gate::{can_edit_roster, find_roster_for_actor, roster_belongs_to, DenyReason, EditGate};
pub use input::{parse_roster_id, parse_trade_amount, parse_trade_note};
pub use ledger::{
    draft_budget_summary, keeper_summary, manager_label, trade_summary, BudgetEntry,
    KeeperSummaryEntry, KeptPlayer, SeasonLedger, TradeSummaryEntry,
};
pub use rules::LeagueRules;
pub use sync::{
    apply_edit, check_trade_links, plan_edit, EditOutcome, LinkCommit, LinkViolation,
    RejectReason, RosterEdit, TradeLinkPlan,
};
pub use types::{
    Actor, AuthStatus, KeeperLockState, ManagerRef, ManualTrade, NewManualTrade, PlayerId, Roster,
    RosterId, RosterPlayer, SeasonYear,
};
