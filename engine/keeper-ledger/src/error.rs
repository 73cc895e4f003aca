//! Error types for the keeper ledger

use crate::types::RosterId;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Validation failures raised before any state is touched.
///
/// Authorization denials and ineligible transitions are not errors; see
/// [`crate::sync::RejectReason`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Roster not found: {roster_id}")]
    UnknownRoster { roster_id: RosterId },

    #[error("Roster {roster_id} cannot trade with itself")]
    SelfTrade { roster_id: RosterId },

    #[error("No player at index {index} on roster {roster_id}")]
    PlayerIndexOutOfRange { roster_id: RosterId, index: usize },

    #[error("Invalid trade amount: {value:?}")]
    InvalidAmount { value: String },

    #[error("Invalid roster id: {value:?}")]
    InvalidRosterId { value: String },

    #[error("Trade note is {len} characters, maximum is {max}")]
    NoteTooLong { len: usize, max: usize },

    #[error("Roster {roster_id} already keeps {max} players")]
    KeeperLimitExceeded { roster_id: RosterId, max: usize },

    #[error("Manual trade needs distinct rosters, got {roster_id} on both sides")]
    SameRosterManualTrade { roster_id: RosterId },
}
