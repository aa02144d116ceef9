//! Error types for the rebalancer.

use std::path::PathBuf;

use wholeshare::{AllocationError, Symbol, TargetError};
use wholeshare_broker::BrokerError;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("target allocation error: {0}")]
    Target(#[from] TargetError),

    #[error("no target allocation configured for account type {0:?}")]
    UnknownAccountType(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("brokerage error: {0}")]
    Connection(String),

    #[error("{0}")]
    DataUnavailable(String),

    #[error("cannot allocate: {0}")]
    Allocation(AllocationError),

    #[error("order total cost of ${total:.2} is higher than total cash of ${cash:.2}")]
    Overspend { total: f64, cash: f64 },

    #[error("There is an open order for {symbol} on account {account}, stopping.")]
    ExistingOrderConflict { symbol: Symbol, account: String },

    #[error(
        "Order for {shares} x {symbol} @ {price} on account {account} was rejected for reason '{reason}', stopping."
    )]
    Rejected {
        shares: u64,
        symbol: Symbol,
        price: f64,
        account: String,
        reason: String,
    },

    #[error("confirmation text did not match, no orders placed")]
    ConfirmationMismatch,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code: 2 for plans that failed validation, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Overspend { .. } | Error::ExistingOrderConflict { .. } => 2,
            _ => 1,
        }
    }
}

impl From<BrokerError> for Error {
    fn from(e: BrokerError) -> Self {
        match e {
            BrokerError::Auth(msg) => Error::Auth(msg),
            other => Error::Connection(other.to_string()),
        }
    }
}

impl From<AllocationError> for Error {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::DataUnavailable { .. } => Error::DataUnavailable(e.to_string()),
            other => Error::Allocation(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
