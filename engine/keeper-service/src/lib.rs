//! Keeper service - loads keeper seasons, drives edits and persists them
//!
//! Wraps the pure `keeper-ledger` crate with the I/O around it:
//!
//! - **store**: the [`KeeperStore`] trait plus in-memory and HTTP backends
//! - **reconcile**: merge of current rosters, saved keepers and the prior season
//! - **session**: [`KeeperSession`], the per-season orchestrator
//! - **config** / **logging**: environment and file config, tracing setup

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod memory;
pub mod reconcile;
pub mod session;
pub mod store;

pub use config::{ApiConfig, KeeperServiceConfig, LoggingConfig};
pub use error::{KeeperServiceError, Result};
pub use http::HttpKeeperStore;
pub use memory::{InMemoryKeeperStore, StoreOp};
pub use reconcile::reconcile_season;
pub use session::{EditStatus, KeeperSession, ManualTradeInput, SessionPhase};
pub use store::{
    DraftedPlayer, KeeperSelection, KeeperStore, SavedKeeper, SavedKeepers, SeasonRoster,
};
