//! Ratio-distance allocator: greedy whole-share buying toward target weights.
//!
//! Each step tries one more share of every target symbol, measures how far the
//! whole portfolio would then sit from its target ratios, and buys the share
//! that lands closest. The distance is the sum of squared differences between
//! target and actual weight:
//!
//! ```text
//! distance(S) = Σ_K ( weight[K] / 100 − value'[K] / (total + price[S]) )²
//! ```
//!
//! where `value'[K]` is the current value of `K`, plus `price[S]` when `K == S`.
//!
//! The loop is an explicit state machine. It stays `Searching` until exactly
//! one [`Termination`] applies:
//!
//! - [`Termination::CashExhausted`]: remaining cash is at or below the per-share
//!   fee (or at or below zero when the fee is zero), or the purchase count has
//!   reached `floor(cash / cheapest price)`.
//! - [`Termination::CannotAfford`]: the best next share costs more than the
//!   remaining cash.
//! - [`Termination::NoCandidate`]: no symbol produced a comparable distance.
//!
//! Ties go to the first minimal symbol in target-allocation order.
//!
//! ```
//! use wholeshare::{allocate, AllocationInput, PositionValues, Quotes, Symbol, TargetAllocation};
//!
//! let targets = TargetAllocation::new(vec![
//!     (Symbol::new("A"), 50.0),
//!     (Symbol::new("B"), 50.0),
//! ]).unwrap();
//! let positions = PositionValues::for_targets(&targets);
//! let quotes = Quotes::new()
//!     .with(Symbol::new("A"), Some(10.0))
//!     .with(Symbol::new("B"), Some(20.0));
//!
//! let allocation = allocate(AllocationInput {
//!     cash: 60.0,
//!     fee: 0.0,
//!     targets: &targets,
//!     positions: &positions,
//!     quotes: &quotes,
//! }).unwrap();
//!
//! // A (tie, earlier in the target list), B, A, A; the next best share is B,
//! // which no longer fits in the remaining $10.
//! assert_eq!(allocation.plan.shares(&Symbol::new("A")), 3);
//! assert_eq!(allocation.plan.shares(&Symbol::new("B")), 1);
//! assert_eq!(allocation.remaining_cash, 10.0);
//! ```

use log::{debug, trace};

use crate::allocation::{PositionValues, Quotes, TargetAllocation};
use crate::error::AllocationError;
use crate::plan::BuyOrderPlan;
use crate::Symbol;

/// Inputs to one allocation run. Nothing here is mutated.
#[derive(Clone, Copy, Debug)]
pub struct AllocationInput<'a> {
    /// Uncommitted buying power, already scaled by any dollar-cost-average divisor.
    pub cash: f64,
    /// Fixed fee charged per share bought.
    pub fee: f64,
    pub targets: &'a TargetAllocation,
    /// Current value held per target symbol; their sum is the starting total.
    pub positions: &'a PositionValues,
    pub quotes: &'a Quotes,
}

/// Why the allocator stopped buying.
#[derive(Clone, Debug, PartialEq)]
pub enum Termination {
    CashExhausted,
    CannotAfford { symbol: Symbol, cost: f64 },
    NoCandidate,
}

/// Outcome of a single [`Allocator::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// One share of `symbol` was added to the plan.
    Bought {
        symbol: Symbol,
        price: f64,
        distance: f64,
    },
    /// The allocator reached a terminal state; it will not buy again.
    Finished(Termination),
}

#[derive(Clone, Debug)]
enum State {
    Searching,
    Finished(Termination),
}

/// Result of running the allocator to completion.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub plan: BuyOrderPlan,
    pub termination: Termination,
    /// Every purchase in the order it was chosen.
    pub picks: Vec<Symbol>,
    /// Cash left after prices and fees of all planned shares.
    pub remaining_cash: f64,
    /// Position total including the planned purchases.
    pub total_value: f64,
}

/// Greedy share-at-a-time allocator over a working copy of the snapshot.
#[derive(Clone, Debug)]
pub struct Allocator {
    symbols: Vec<Symbol>,
    /// Target weights (percent), aligned with `symbols`.
    weights: Vec<f64>,
    prices: Vec<f64>,
    values: Vec<f64>,
    shares: Vec<u64>,
    fee: f64,
    remaining: f64,
    total: f64,
    /// Upper bound on purchases: `floor(cash / cheapest price)`.
    max_purchases: u64,
    picks: Vec<Symbol>,
    state: State,
}

impl Allocator {
    /// Prepare an allocator, checking that cash and fee are usable and that
    /// every target symbol has an ask price.
    ///
    /// A missing quote aborts the whole rebalance: no partial plan is built
    /// around an unpriced symbol.
    pub fn new(input: AllocationInput<'_>) -> Result<Self, AllocationError> {
        if !input.cash.is_finite() || input.cash < 0.0 {
            return Err(AllocationError::InvalidCash(input.cash));
        }
        if !input.fee.is_finite() || input.fee < 0.0 {
            return Err(AllocationError::InvalidFee(input.fee));
        }

        let n = input.targets.len();
        let mut symbols = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);
        let mut prices = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);

        for (symbol, weight) in input.targets.iter() {
            let price = input
                .quotes
                .ask(symbol)
                .ok_or_else(|| AllocationError::DataUnavailable {
                    symbol: symbol.clone(),
                })?;
            symbols.push(symbol.clone());
            weights.push(weight);
            prices.push(price);
            values.push(input.positions.get(symbol));
        }

        let cheapest = prices.iter().copied().fold(f64::INFINITY, f64::min);
        // Float-to-int casts saturate, so an absurd ratio cannot wrap.
        let max_purchases = (input.cash / cheapest).floor() as u64;

        Ok(Self {
            total: values.iter().sum(),
            shares: vec![0; n],
            symbols,
            weights,
            prices,
            values,
            fee: input.fee,
            remaining: input.cash,
            max_purchases,
            picks: Vec::new(),
            state: State::Searching,
        })
    }

    /// Advance by at most one share.
    pub fn step(&mut self) -> Step {
        if let State::Finished(reason) = &self.state {
            return Step::Finished(reason.clone());
        }

        if self.remaining <= self.fee || self.remaining <= 0.0 {
            return self.finish(Termination::CashExhausted);
        }

        let Some((idx, distance)) = self.best_candidate() else {
            return self.finish(Termination::NoCandidate);
        };

        let price = self.prices[idx];
        let cost = price + self.fee;
        if cost > self.remaining {
            let symbol = self.symbols[idx].clone();
            return self.finish(Termination::CannotAfford { symbol, cost });
        }
        // Float subtraction can stall on tiny prices; the cash never covered more.
        if self.picks.len() as u64 >= self.max_purchases {
            return self.finish(Termination::CashExhausted);
        }

        self.shares[idx] += 1;
        self.remaining -= cost;
        self.total += price;
        self.values[idx] += price;

        let symbol = self.symbols[idx].clone();
        trace!(
            "buy 1 {symbol} @ {price} (distance {distance:.6}, remaining {:.4})",
            self.remaining
        );
        self.picks.push(symbol.clone());

        Step::Bought {
            symbol,
            price,
            distance,
        }
    }

    /// Step until a terminal state is reached.
    pub fn run(mut self) -> Allocation {
        let termination = loop {
            if let Step::Finished(reason) = self.step() {
                break reason;
            }
        };

        debug!(
            "allocation finished after {} shares: {termination:?}",
            self.picks.len()
        );

        let plan = BuyOrderPlan::from_entries(
            self.symbols
                .iter()
                .cloned()
                .zip(self.shares.iter().copied()),
        );

        Allocation {
            plan,
            termination,
            picks: self.picks,
            remaining_cash: self.remaining,
            total_value: self.total,
        }
    }

    /// Cash not yet committed to planned shares and their fees.
    pub fn remaining_cash(&self) -> f64 {
        self.remaining
    }

    /// Purchases made so far, in order.
    pub fn picks(&self) -> &[Symbol] {
        &self.picks
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished(_))
    }

    fn finish(&mut self, reason: Termination) -> Step {
        self.state = State::Finished(reason.clone());
        Step::Finished(reason)
    }

    /// Symbol index whose next share minimises the ratio distance.
    ///
    /// Strict `<` keeps the first minimum in target order.
    fn best_candidate(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        let mut min_distance = f64::MAX;

        for (idx, &price) in self.prices.iter().enumerate() {
            let total = self.total + price;
            let distance = ratio_distance(
                self.weights
                    .iter()
                    .zip(&self.values)
                    .enumerate()
                    .map(|(k, (&weight, &value))| {
                        let value = if k == idx { value + price } else { value };
                        (weight, value)
                    }),
                total,
            );

            if distance < min_distance {
                min_distance = distance;
                best = Some((idx, distance));
            }
        }

        best
    }
}

/// Sum of squared differences between target ratio (`weight / 100`) and
/// actual ratio (`value / total`) over `(weight, value)` pairs.
///
/// A non-positive `total` counts every actual ratio as zero.
pub fn ratio_distance<I>(pairs: I, total: f64) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    pairs
        .into_iter()
        .map(|(weight, value)| {
            let actual = if total > 0.0 { value / total } else { 0.0 };
            let diff = weight / 100.0 - actual;
            diff * diff
        })
        .sum()
}

/// Run the allocator over `input` to completion.
pub fn allocate(input: AllocationInput<'_>) -> Result<Allocation, AllocationError> {
    Ok(Allocator::new(input)?.run())
}
