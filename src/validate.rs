//! Plan validation before money is committed.
//!
//! The allocator already refuses unaffordable shares; the cost check here is
//! recomputed from scratch so that a plan built any other way (by hand, or by
//! a future allocator) is held to the same limit.

use crate::allocation::Quotes;
use crate::error::PlanError;
use crate::plan::BuyOrderPlan;
use crate::Symbol;

/// Recomputed cost of a plan against the cash it was sized for.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlanCost {
    /// Σ shares × ask price.
    pub order_value: f64,
    /// Σ shares × per-share fee.
    pub fees: f64,
    pub total: f64,
    pub cash: f64,
    /// Cash left after the plan (negative on overspend).
    pub leftover: f64,
}

impl PlanCost {
    pub fn is_overspent(&self) -> bool {
        self.total > self.cash
    }
}

/// Cost `plan` at the quoted ask prices plus `fee` per share.
pub fn plan_cost(
    plan: &BuyOrderPlan,
    quotes: &Quotes,
    fee: f64,
    cash: f64,
) -> Result<PlanCost, PlanError> {
    let mut order_value = 0.0;
    let mut fees = 0.0;

    for (symbol, shares) in plan.iter() {
        let price = quotes
            .ask(symbol)
            .ok_or_else(|| PlanError::MissingQuote {
                symbol: symbol.clone(),
            })?;
        order_value += shares as f64 * price;
        fees += shares as f64 * fee;
    }

    let total = order_value + fees;
    Ok(PlanCost {
        order_value,
        fees,
        total,
        cash,
        leftover: cash - total,
    })
}

/// Fail with [`PlanError::Overspend`] when the plan costs strictly more than the cash.
pub fn check_cash(cost: &PlanCost) -> Result<(), PlanError> {
    if cost.is_overspent() {
        return Err(PlanError::Overspend {
            total: cost.total,
            cash: cost.cash,
        });
    }
    Ok(())
}

/// Fail on the first open order whose symbol is also in the plan.
///
/// `open_symbols` is scanned in the order the brokerage listed the orders.
pub fn check_open_orders<'a, I>(plan: &BuyOrderPlan, open_symbols: I) -> Result<(), PlanError>
where
    I: IntoIterator<Item = &'a Symbol>,
{
    match open_symbols.into_iter().find(|s| plan.contains(s)) {
        Some(symbol) => Err(PlanError::ExistingOrderConflict {
            symbol: symbol.clone(),
        }),
        None => Ok(()),
    }
}

/// Run every check and return the plan's cost.
///
/// An empty plan passes with a zero cost.
pub fn validate_plan<'a, I>(
    plan: &BuyOrderPlan,
    quotes: &Quotes,
    fee: f64,
    cash: f64,
    open_symbols: I,
) -> Result<PlanCost, PlanError>
where
    I: IntoIterator<Item = &'a Symbol>,
{
    let cost = plan_cost(plan, quotes, fee, cash)?;
    check_cash(&cost)?;
    check_open_orders(plan, open_symbols)?;
    Ok(cost)
}
