//! Error types for KeeperService

use keeper_ledger::LedgerError;
use thiserror::Error;

/// Result type alias for keeper service operations
pub type Result<T> = std::result::Result<T, KeeperServiceError>;

#[derive(Error, Debug)]
pub enum KeeperServiceError {
    /// Input rejected before any state changed
    #[error("Validation error: {0}")]
    Validation(#[from] LedgerError),

    #[error("Keeper API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Keeper store unavailable: {operation}")]
    StoreUnavailable { operation: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("No season selected")]
    NoSeasonSelected,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl KeeperServiceError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }

    pub fn unavailable(operation: impl Into<String>) -> Self {
        Self::StoreUnavailable { operation: operation.into() }
    }

    /// True for failures talking to the store, as opposed to bad input
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::StoreUnavailable { .. } | Self::HttpError(_))
    }
}
