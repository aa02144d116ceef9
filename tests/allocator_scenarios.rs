//! Scenario tests for the allocate → validate pipeline through the public API.

use wholeshare::{
    AllocationError, AllocationInput, BuyOrderPlan, PlanError, PositionValues, Quotes, Symbol,
    TargetAllocation, Termination, allocate, validate_plan,
};

const ECN_FEE: f64 = 0.0035;

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn targets(entries: &[(&str, f64)]) -> TargetAllocation {
    TargetAllocation::new(entries.iter().map(|(s, w)| (sym(s), *w)).collect()).unwrap()
}

fn quotes(entries: &[(&str, Option<f64>)]) -> Quotes {
    let mut q = Quotes::new();
    for (s, p) in entries {
        q.insert(sym(s), *p);
    }
    q
}

fn no_open_orders() -> [Symbol; 0] {
    []
}

// ============================================================================
// Two-symbol, equal-weight scenario
// ============================================================================

#[test]
fn equal_weights_favour_the_cheaper_share_first() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);
    let cash = 1000.0;

    let allocation = allocate(AllocationInput {
        cash,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert_eq!(allocation.picks[0], sym("A"));
    assert_eq!(allocation.picks[1], sym("B"));

    let cost = validate_plan(&allocation.plan, &quotes, ECN_FEE, cash, &no_open_orders()).unwrap();
    assert!(cost.total <= cash);
    assert!((cost.leftover - allocation.remaining_cash).abs() < 1e-9);

    // No symbol overshoots its target by more than one share's worth of weight.
    let total = allocation.total_value;
    for (symbol, weight) in targets.iter() {
        let price = quotes.ask(symbol).unwrap();
        let value = allocation.plan.shares(symbol) as f64 * price;
        let overshoot = value / total - weight / 100.0;
        assert!(
            overshoot <= price / total + 1e-12,
            "{symbol} overshoots by {overshoot}"
        );
    }
}

#[test]
fn equal_weights_split_cash_evenly() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);

    let allocation = allocate(AllocationInput {
        cash: 1000.0,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert_eq!(allocation.plan.shares(&sym("A")), 49);
    assert_eq!(allocation.plan.shares(&sym("B")), 25);
    assert!(matches!(
        allocation.termination,
        Termination::CannotAfford { ref symbol, .. } if *symbol == sym("A")
    ));
}

// ============================================================================
// Single symbol
// ============================================================================

#[test]
fn single_full_weight_symbol_buys_floor_of_cash_over_cost() {
    let targets = targets(&[("XUU.TO", 100.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("XUU.TO", Some(40.0))]);

    let allocation = allocate(AllocationInput {
        cash: 1000.0,
        fee: 1.0,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    // floor(1000 / 41) = 24
    assert_eq!(allocation.plan.shares(&sym("XUU.TO")), 24);
    assert_eq!(allocation.plan.len(), 1);
    assert_eq!(allocation.remaining_cash, 16.0);
}

// ============================================================================
// Data errors and empty plans
// ============================================================================

#[test]
fn unavailable_quote_aborts_before_any_plan() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", None), ("B", Some(20.0))]);

    let err = allocate(AllocationInput {
        cash: 1000.0,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap_err();

    assert_eq!(err, AllocationError::DataUnavailable { symbol: sym("A") });
}

#[test]
fn all_quotes_unavailable_aborts() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);

    let err = allocate(AllocationInput {
        cash: 1000.0,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &Quotes::new(),
    })
    .unwrap_err();

    assert!(matches!(err, AllocationError::DataUnavailable { .. }));
}

#[test]
fn zero_cash_is_nothing_to_do() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);

    let allocation = allocate(AllocationInput {
        cash: 0.0,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert!(allocation.plan.is_empty());
    let cost = validate_plan(&allocation.plan, &quotes, ECN_FEE, 0.0, &no_open_orders()).unwrap();
    assert_eq!(cost.total, 0.0);
}

#[test]
fn cash_below_every_price_is_an_empty_plan() {
    let targets = targets(&[("A", 50.0), ("B", 50.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);

    let allocation = allocate(AllocationInput {
        cash: 9.99,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert!(allocation.plan.is_empty());
    assert!(matches!(
        allocation.termination,
        Termination::CannotAfford { .. }
    ));
}

// ============================================================================
// Existing holdings
// ============================================================================

#[test]
fn overweight_holding_receives_no_buys() {
    let targets = targets(&[("VCN.TO", 30.0), ("XUU.TO", 30.0), ("ZAG.TO", 40.0)]);
    let mut positions = PositionValues::for_targets(&targets);
    positions.set(&sym("VCN.TO"), 5_000.0);
    let quotes = quotes(&[
        ("VCN.TO", Some(40.0)),
        ("XUU.TO", Some(50.0)),
        ("ZAG.TO", Some(15.0)),
    ]);

    let allocation = allocate(AllocationInput {
        cash: 1_000.0,
        fee: ECN_FEE,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert!(!allocation.plan.is_empty());
    assert_eq!(allocation.plan.shares(&sym("VCN.TO")), 0);
    assert!(allocation.picks.iter().all(|s| *s != sym("VCN.TO")));
}

#[test]
fn weights_need_not_sum_to_one_hundred() {
    let targets = targets(&[("A", 30.0), ("B", 30.0)]);
    let positions = PositionValues::for_targets(&targets);
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(10.0))]);

    let allocation = allocate(AllocationInput {
        cash: 100.0,
        fee: 0.0,
        targets: &targets,
        positions: &positions,
        quotes: &quotes,
    })
    .unwrap();

    assert_eq!(allocation.plan.total_shares(), 10);
    assert_eq!(allocation.plan.shares(&sym("A")), 5);
    assert_eq!(allocation.plan.shares(&sym("B")), 5);
}

// ============================================================================
// Validation of hand-built plans
// ============================================================================

#[test]
fn hand_built_overspending_plan_is_rejected() {
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);
    let plan = BuyOrderPlan::from_entries([(sym("A"), 50), (sym("B"), 26)]);

    let err = validate_plan(&plan, &quotes, ECN_FEE, 1000.0, &no_open_orders()).unwrap_err();
    assert!(matches!(err, PlanError::Overspend { total, cash } if total > cash));
}

#[test]
fn open_order_on_planned_symbol_conflicts() {
    let quotes = quotes(&[("A", Some(10.0)), ("B", Some(20.0))]);
    let plan = BuyOrderPlan::from_entries([(sym("A"), 1), (sym("B"), 1)]);
    let open = [sym("A")];

    let err = validate_plan(&plan, &quotes, ECN_FEE, 1000.0, &open).unwrap_err();
    assert_eq!(err, PlanError::ExistingOrderConflict { symbol: sym("A") });
}
