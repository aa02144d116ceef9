//! Plan report: per-order cost lines, totals, and current vs projected weights.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wholeshare::validate::plan_cost;
use wholeshare::{BuyOrderPlan, PlanCost, PlanError, PositionValues, Quotes, TargetAllocation};

/// What a plan will buy and what the account looks like afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub generated_at: DateTime<Utc>,
    pub account: String,
    pub orders: Vec<OrderLine>,
    pub weights: Vec<WeightLine>,
    pub cost: PlanCost,
}

/// One planned order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub symbol: String,
    pub shares: u64,
    pub price: f64,
    pub value: f64,
    pub fee: f64,
}

/// One symbol's weights, in percent of the target-symbol total.
#[derive(Debug, Clone, Serialize)]
pub struct WeightLine {
    pub symbol: String,
    pub target_pct: f64,
    pub current_pct: f64,
    pub projected_pct: f64,
}

/// Inputs the report is built from.
pub struct ReportInput<'a> {
    pub account: &'a str,
    pub plan: &'a BuyOrderPlan,
    pub quotes: &'a Quotes,
    pub fee: f64,
    pub cash: f64,
    pub targets: &'a TargetAllocation,
    pub positions: &'a PositionValues,
}

impl PlanReport {
    /// Cost the plan and project the resulting weights.
    pub fn new(input: ReportInput<'_>) -> Result<Self, PlanError> {
        let cost = plan_cost(input.plan, input.quotes, input.fee, input.cash)?;

        let mut orders = Vec::with_capacity(input.plan.len());
        for (symbol, shares) in input.plan.iter() {
            let price = input
                .quotes
                .ask(symbol)
                .ok_or_else(|| PlanError::MissingQuote {
                    symbol: symbol.clone(),
                })?;
            orders.push(OrderLine {
                symbol: symbol.as_str().to_string(),
                shares,
                price,
                value: shares as f64 * price,
                fee: shares as f64 * input.fee,
            });
        }

        let current_total = input.positions.total();
        let projected_total = current_total + cost.order_value;
        let weights = input
            .targets
            .iter()
            .map(|(symbol, weight)| {
                let current = input.positions.get(symbol);
                let bought = orders
                    .iter()
                    .find(|o| o.symbol == symbol.as_str())
                    .map_or(0.0, |o| o.value);
                WeightLine {
                    symbol: symbol.as_str().to_string(),
                    target_pct: weight,
                    current_pct: percent(current, current_total),
                    projected_pct: percent(current + bought, projected_total),
                }
            })
            .collect();

        Ok(Self {
            generated_at: Utc::now(),
            account: input.account.to_string(),
            orders,
            weights,
            cost,
        })
    }
}

impl PlanReport {
    /// Pretty JSON for scripts that consume the plan.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn percent(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total * 100.0 } else { 0.0 }
}

impl std::fmt::Display for PlanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "PLAN for account {} ({}):",
            self.account,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        for o in &self.orders {
            writeln!(
                f,
                "  Will place order for {} x {} @ {} costing ${:.2} and ${:.2} in fees",
                o.shares, o.symbol, o.price, o.value, o.fee
            )?;
        }
        writeln!(
            f,
            "\n  Total cost is ${:.2} and ${:.2} in fees, leaving you with ${:.2} in cash",
            self.cost.order_value, self.cost.fees, self.cost.leftover
        )?;

        writeln!(f, "\nALLOCATION:")?;
        writeln!(
            f,
            "  {:10} {:>10} {:>10} {:>10}",
            "Symbol", "Target%", "Current%", "After%"
        )?;
        for w in &self.weights {
            writeln!(
                f,
                "  {:10} {:>9.2}% {:>9.2}% {:>9.2}%",
                w.symbol, w.target_pct, w.current_pct, w.projected_pct
            )?;
        }
        Ok(())
    }
}
