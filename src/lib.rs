//! # wholeshare
//!
//! A deterministic whole-share buy allocator for rebalancing a brokerage
//! account toward target weights.
//!
//! ## Features
//!
//! - **Greedy ratio-distance allocation**: buys one share at a time, always the
//!   share that brings the whole portfolio closest to its target ratios
//! - **Integer shares only**: no fractional quantities, no selling
//! - **Per-share fees**: each purchase costs its ask price plus a fixed fee
//! - **Deterministic**: identical inputs give an identical plan and an identical
//!   selection order; ties go to the earlier symbol in the target list
//! - **Independent validation**: plans are re-costed and checked against open
//!   orders before anything is submitted
//!
//! ## Quick Start
//!
//! ```
//! use wholeshare::{
//!     allocate, validate_plan, AllocationInput, PositionValues, Quotes, Symbol, TargetAllocation,
//! };
//!
//! let targets = TargetAllocation::new(vec![
//!     (Symbol::new("VCN.TO"), 60.0),
//!     (Symbol::new("ZAG.TO"), 40.0),
//! ])
//! .unwrap();
//!
//! let mut positions = PositionValues::for_targets(&targets);
//! positions.set(&Symbol::new("VCN.TO"), 500.0);
//!
//! let quotes = Quotes::new()
//!     .with(Symbol::new("VCN.TO"), Some(50.0))
//!     .with(Symbol::new("ZAG.TO"), Some(25.0));
//!
//! let allocation = allocate(AllocationInput {
//!     cash: 500.0,
//!     fee: 0.0,
//!     targets: &targets,
//!     positions: &positions,
//!     quotes: &quotes,
//! })
//! .unwrap();
//!
//! // $1,000 total: $600 VCN.TO and $400 ZAG.TO is an exact fit.
//! assert_eq!(allocation.plan.shares(&Symbol::new("VCN.TO")), 2);
//! assert_eq!(allocation.plan.shares(&Symbol::new("ZAG.TO")), 16);
//!
//! let no_open_orders: [Symbol; 0] = [];
//! let cost = validate_plan(&allocation.plan, &quotes, 0.0, 500.0, &no_open_orders).unwrap();
//! assert_eq!(cost.total, 500.0);
//! ```
//!
//! ## Amounts
//!
//! Money is plain `f64` currency units throughout. Nothing in the allocation
//! loop rounds; rounding is for display only.

pub mod allocation;
pub mod allocator;
mod error;
mod plan;
mod types;
pub mod validate;

// Re-export public API
pub use allocation::{PositionValues, Quotes, TargetAllocation};
pub use allocator::{
    Allocation, AllocationInput, Allocator, Step, Termination, allocate, ratio_distance,
};
pub use error::{AllocationError, PlanError, TargetError};
pub use plan::BuyOrderPlan;
pub use types::{MAX_SYMBOL_LEN, Symbol};
pub use validate::{PlanCost, validate_plan};
