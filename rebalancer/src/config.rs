//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use wholeshare::TargetAllocation;
use wholeshare_broker::questrade::auth::DEFAULT_OAUTH_URL;

use crate::error::{Error, Result};
use crate::target::AccountTargets;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub cash: CashConfig,
    /// Target allocation per account type (e.g. "TFSA", "Margin").
    #[serde(default)]
    pub accounts: FxHashMap<String, AccountTargets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.json")
}
fn default_oauth_url() -> String {
    DEFAULT_OAUTH_URL.into()
}
fn default_timeout() -> u64 {
    30
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            oauth_url: default_oauth_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ConnectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostConfig {
    /// ECN fee charged per share bought.
    #[serde(default = "default_fee")]
    pub fee_per_share: f64,
}

fn default_fee() -> f64 {
    0.0035
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fee_per_share: default_fee(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CashConfig {
    /// Currency whose cash balance funds the purchases.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Only `cash / dollar_cost_average` is spent per run.
    #[serde(default = "default_dca")]
    pub dollar_cost_average: f64,
}

fn default_currency() -> String {
    "CAD".into()
}
fn default_dca() -> f64 {
    1.0
}

impl Default for CashConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            dollar_cost_average: default_dca(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.connection.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be > 0".into()));
        }
        if self.connection.oauth_url.is_empty() {
            return Err(Error::Config("oauth_url must not be empty".into()));
        }
        if !self.cost.fee_per_share.is_finite() || self.cost.fee_per_share < 0.0 {
            return Err(Error::Config("fee_per_share must be >= 0".into()));
        }
        if self.cash.currency.trim().is_empty() {
            return Err(Error::Config("cash currency must not be empty".into()));
        }
        check_dca(self.cash.dollar_cost_average)?;
        for (account_type, targets) in &self.accounts {
            targets.to_allocation().map_err(|e| {
                Error::Config(format!("targets for account type {account_type}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Validated target allocation for an account type.
    pub fn targets_for(&self, account_type: &str) -> Result<TargetAllocation> {
        let targets = self
            .accounts
            .get(account_type)
            .ok_or_else(|| Error::UnknownAccountType(account_type.to_string()))?;
        Ok(targets.to_allocation()?)
    }
}

/// The dollar-cost-average divisor must be a finite number of at least 1.
pub fn check_dca(dca: f64) -> Result<()> {
    if !dca.is_finite() || dca < 1.0 {
        return Err(Error::Config(format!(
            "dollar_cost_average must be >= 1.0, got {dca}"
        )));
    }
    Ok(())
}
