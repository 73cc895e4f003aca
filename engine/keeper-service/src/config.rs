//! Configuration for KeeperService

use std::path::Path;

use keeper_ledger::LeagueRules;
use serde::{Deserialize, Serialize};

use crate::{KeeperServiceError, Result};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["json", "pretty", "compact"];

/// Keeper backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            auth_token: None,
            timeout_secs: 10,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json`, `pretty` or anything else for the compact format
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

/// KeeperService configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeeperServiceConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rules: LeagueRules,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KeeperServiceConfig {
    /// Create config from environment variables, reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build config from a variable lookup; unset variables keep their defaults
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base_url) = get("KEEPER_API_URL") {
            config.api.base_url = base_url;
        }
        config.api.auth_token = get("KEEPER_API_TOKEN").filter(|token| !token.is_empty());

        if let Some(timeout) = get("KEEPER_API_TIMEOUT_SECS") {
            config.api.timeout_secs = timeout.parse::<u64>().map_err(|_| {
                KeeperServiceError::invalid_config("Invalid KEEPER_API_TIMEOUT_SECS")
            })?;
        }

        if let Some(budget) = get("KEEPER_DRAFT_BUDGET") {
            config.rules.draft_budget_base = budget
                .parse::<i64>()
                .map_err(|_| KeeperServiceError::invalid_config("Invalid KEEPER_DRAFT_BUDGET"))?;
        }

        if let Some(max_keepers) = get("KEEPER_MAX_KEEPERS") {
            config.rules.max_keepers_per_roster = max_keepers
                .parse::<usize>()
                .map_err(|_| KeeperServiceError::invalid_config("Invalid KEEPER_MAX_KEEPERS"))?;
        }

        if let Some(level) = get("KEEPER_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = get("KEEPER_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            KeeperServiceError::invalid_config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            KeeperServiceError::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(KeeperServiceError::invalid_config("api.base_url cannot be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(KeeperServiceError::invalid_config(
                "api.base_url must start with http:// or https://",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(KeeperServiceError::invalid_config("api.timeout_secs must be greater than 0"));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(KeeperServiceError::invalid_config(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(KeeperServiceError::invalid_config(format!(
                "Unknown log format '{}'",
                self.logging.format
            )));
        }
        self.rules.validate().map_err(KeeperServiceError::invalid_config)?;
        Ok(())
    }
}
