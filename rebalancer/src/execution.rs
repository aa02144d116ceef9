//! Execution orchestrator: snapshot → allocate → report → validate → confirm → submit.
//!
//! This is the main workflow that ties together all components.

use log::{info, warn};
use wholeshare::{AllocationInput, BuyOrderPlan, PlanError, Symbol, Termination, allocate};
use wholeshare_broker::{Account, Broker, OrderRequest, OrderStateFilter};

use crate::config::{Config, check_dca};
use crate::error::{Error, Result};
use crate::report::{PlanReport, ReportInput};
use crate::snapshot::Snapshot;

/// Literal the user must type to release orders.
pub const CONFIRMATION_WORD: &str = "CONFIRM";

/// Whether a run stops after reporting or goes on to place orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Show,
    Place { confirm: bool },
}

/// A rebalance request for one account.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub account_type: String,
    pub account_number: String,
    pub mode: Mode,
    /// Overrides `cash.dollar_cost_average` when set.
    pub dca: Option<f64>,
    /// Print the report as JSON instead of a table.
    pub json: bool,
}

/// An order the brokerage accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub symbol: Symbol,
    pub shares: u64,
    pub price: f64,
    pub order_id: Option<u64>,
}

/// How a successful run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Cash did not stretch to a single share.
    NothingToDo(Termination),
    /// The plan passed validation and was only shown.
    Shown(PlanReport),
    /// Every order in the plan was placed.
    Placed {
        report: PlanReport,
        orders: Vec<PlacedOrder>,
    },
}

/// Asks the user to type the confirmation word.
pub trait Confirmer {
    /// Show `prompt` and return what the user typed.
    fn confirm(&self, prompt: &str) -> Result<String>;
}

/// Terminal prompt via dialoguer.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// List the accounts the session can see.
pub fn list_accounts<B: Broker + ?Sized>(broker: &B) -> Result<Vec<Account>> {
    Ok(broker.accounts()?)
}

/// Execute a full rebalance run.
pub fn run<B, C>(broker: &B, config: &Config, request: &RunRequest, confirmer: &C) -> Result<Outcome>
where
    B: Broker + ?Sized,
    C: Confirmer + ?Sized,
{
    let account = request.account_number.as_str();

    // 1. Targets and cash split
    let targets = config.targets_for(&request.account_type)?;
    let dca = request.dca.unwrap_or(config.cash.dollar_cost_average);
    check_dca(dca)?;

    // 2. Snapshot
    let snapshot = Snapshot::fetch(broker, account, &targets, &config.cash.currency, dca)?;

    // 3. Allocate
    let fee = config.cost.fee_per_share;
    let allocation = allocate(AllocationInput {
        cash: snapshot.cash,
        fee,
        targets: &targets,
        positions: &snapshot.positions,
        quotes: &snapshot.quotes,
    })?;
    info!(
        "Allocated {} shares across {} symbols ({:?})",
        allocation.plan.total_shares(),
        allocation.plan.len(),
        allocation.termination
    );

    if allocation.plan.is_empty() {
        println!(
            "Nothing to do: ${:.2} in cash does not buy a single target share.",
            snapshot.cash
        );
        return Ok(Outcome::NothingToDo(allocation.termination));
    }

    // 4. Report
    let report = PlanReport::new(ReportInput {
        account,
        plan: &allocation.plan,
        quotes: &snapshot.quotes,
        fee,
        cash: snapshot.cash,
        targets: &targets,
        positions: &snapshot.positions,
    })
    .map_err(|e| plan_error(e, account))?;
    if request.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    // 5. Validate cost and open orders
    let open_orders = broker.orders(account, OrderStateFilter::Open)?;
    wholeshare::validate_plan(
        &allocation.plan,
        &snapshot.quotes,
        fee,
        snapshot.cash,
        open_orders.iter().map(|o| &o.symbol),
    )
    .map_err(|e| plan_error(e, account))?;

    // 6. Show only stops here
    let confirm = match request.mode {
        Mode::Show => return Ok(Outcome::Shown(report)),
        Mode::Place { confirm } => confirm,
    };

    // 7. Confirm
    if confirm {
        let typed = confirmer.confirm(&format!(
            "Type {CONFIRMATION_WORD} to place these orders on account {account}"
        ))?;
        if typed.trim() != CONFIRMATION_WORD {
            warn!("Confirmation text did not match, aborting");
            return Err(Error::ConfirmationMismatch);
        }
    }

    // 8. Submit
    let orders = submit_plan(broker, &snapshot, &allocation.plan)?;
    println!("\nPlaced {} orders on account {account}.", orders.len());
    Ok(Outcome::Placed { report, orders })
}

/// Place one day limit buy per plan entry, in plan order, at the snapshot ask.
///
/// Stops at the first rejection or broker error. Orders placed before that
/// stay placed.
pub fn submit_plan<B: Broker + ?Sized>(
    broker: &B,
    snapshot: &Snapshot,
    plan: &BuyOrderPlan,
) -> Result<Vec<PlacedOrder>> {
    let account = snapshot.account.as_str();
    let mut placed = Vec::with_capacity(plan.len());

    for (symbol, shares) in plan.iter() {
        let price = snapshot
            .quotes
            .ask(symbol)
            .ok_or_else(|| Error::DataUnavailable(format!("no quote for {symbol}")))?;
        let symbol_id = snapshot
            .symbol_ids
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::DataUnavailable(format!("no symbol id for {symbol}")))?;

        let order = OrderRequest::limit_buy(account, symbol.clone(), symbol_id, shares, price)?;
        let ack = broker.place_order(&order)?;

        if let Some(reason) = ack.rejection_reason {
            warn!("Order for {shares} x {symbol} rejected: {reason}");
            return Err(Error::Rejected {
                shares,
                symbol: symbol.clone(),
                price,
                account: account.to_string(),
                reason,
            });
        }

        println!("Placed order for {shares} x {symbol} @ {price} on account {account}");
        placed.push(PlacedOrder {
            symbol: symbol.clone(),
            shares,
            price,
            order_id: ack.order_id,
        });
    }

    Ok(placed)
}

fn plan_error(e: PlanError, account: &str) -> Error {
    match e {
        PlanError::Overspend { total, cash } => {
            warn!("Plan costs {total:.2} against {cash:.2} in cash");
            Error::Overspend { total, cash }
        }
        PlanError::ExistingOrderConflict { symbol } => {
            warn!("Open order conflict on {symbol}");
            Error::ExistingOrderConflict {
                symbol,
                account: account.to_string(),
            }
        }
        PlanError::MissingQuote { symbol } => Error::DataUnavailable(format!(
            "no quote for {symbol} (the market is most likely closed)"
        )),
    }
}
