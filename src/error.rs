//! Error types for target construction, allocation, and plan validation.

use crate::Symbol;

/// Errors building a [`TargetAllocation`](crate::TargetAllocation).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TargetError {
    /// At least one symbol is required.
    #[error("target allocation has no symbols")]
    Empty,

    /// Each symbol may appear once.
    #[error("duplicate symbol in target allocation: {0}")]
    DuplicateSymbol(Symbol),

    /// Weights must be finite and strictly positive.
    #[error("target weight for {symbol} must be a positive number, got {weight}")]
    NonPositiveWeight { symbol: Symbol, weight: f64 },

    /// A configured ticker is not a usable symbol.
    #[error("invalid symbol {0:?}")]
    InvalidSymbol(String),
}

/// Errors that prevent the allocator from producing a plan.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AllocationError {
    /// A target symbol has no usable ask price, usually because the market is closed.
    #[error("no quote available for {symbol} (the market is most likely closed)")]
    DataUnavailable { symbol: Symbol },

    #[error("available cash must be a non-negative number, got {0}")]
    InvalidCash(f64),

    #[error("per-share fee must be a non-negative number, got {0}")]
    InvalidFee(f64),
}

/// Errors raised while validating a plan before submission.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Recomputed plan cost exceeds the cash it was sized against.
    #[error("order total cost of ${total:.2} is higher than total cash of ${cash:.2}")]
    Overspend { total: f64, cash: f64 },

    /// The account already has an open order for a planned symbol.
    #[error("there is already an open order for {symbol}")]
    ExistingOrderConflict { symbol: Symbol },

    /// A planned symbol has no usable ask price to cost it with.
    #[error("no quote available to cost planned order for {symbol}")]
    MissingQuote { symbol: Symbol },
}
