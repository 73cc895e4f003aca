//! Parsing of raw UI input at the ledger boundary

use crate::error::{LedgerError, Result};
use crate::types::RosterId;

/// Parse a trade amount field. Empty input clears the amount.
pub fn parse_trade_amount(value: &str) -> Result<Option<u32>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u32>() {
        Ok(amount) if amount > 0 => Ok(Some(amount)),
        _ => Err(LedgerError::InvalidAmount { value: value.to_string() }),
    }
}

/// Parse a roster id chosen from a counterparty picker
pub fn parse_roster_id(value: &str) -> Result<RosterId> {
    let trimmed = value.trim();
    match trimmed.parse::<RosterId>() {
        Ok(roster_id) if roster_id > 0 => Ok(roster_id),
        _ => Err(LedgerError::InvalidRosterId { value: value.to_string() }),
    }
}

/// Normalise a free-form note: blank becomes `None`, length is capped
pub fn parse_trade_note(value: &str, max_len: usize) -> Result<Option<String>> {
    let len = value.chars().count();
    if len > max_len {
        return Err(LedgerError::NoteTooLong { len, max: max_len });
    }
    if value.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}
