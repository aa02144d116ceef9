//! Integration tests for the rebalance pipeline against the mock broker.

use std::cell::Cell;

use wholeshare::{Symbol, Termination};
use wholeshare_broker::mock::{MockBroker, MockBrokerBuilder, RejectMode};
use wholeshare_broker::{BrokerSide, OrderType, SymbolId, TimeInForce};
use wholeshare_rebalancer::config::Config;
use wholeshare_rebalancer::error::{Error, Result};
use wholeshare_rebalancer::execution::{
    self, CONFIRMATION_WORD, Confirmer, Mode, Outcome, RunRequest,
};

const ACCOUNT: &str = "51234567";

fn config() -> Config {
    Config::from_toml(
        r#"
[cost]
fee_per_share = 0.0035

[accounts.TFSA]
targets = [
    { symbol = "VCN.TO", weight = 50 },
    { symbol = "XUU.TO", weight = 50 },
]
"#,
    )
    .unwrap()
}

fn market() -> MockBrokerBuilder {
    MockBroker::builder()
        .with_account("TFSA", ACCOUNT)
        .with_balance("CAD", 1_000.0)
        .with_symbol("VCN.TO", 8049, Some(10.0))
        .with_symbol("XUU.TO", 24530541, Some(20.0))
}

fn request(mode: Mode) -> RunRequest {
    RunRequest {
        account_type: "TFSA".into(),
        account_number: ACCOUNT.into(),
        mode,
        dca: None,
        json: false,
    }
}

/// Types a fixed answer and counts how often it was asked.
struct Typed {
    answer: &'static str,
    asked: Cell<usize>,
}

impl Typed {
    fn new(answer: &'static str) -> Self {
        Self {
            answer,
            asked: Cell::new(0),
        }
    }
}

impl Confirmer for Typed {
    fn confirm(&self, _prompt: &str) -> Result<String> {
        self.asked.set(self.asked.get() + 1);
        Ok(self.answer.to_string())
    }
}

fn vcn() -> Symbol {
    Symbol::new("VCN.TO")
}
fn xuu() -> Symbol {
    Symbol::new("XUU.TO")
}

// ============================================================================
// Happy paths
// ============================================================================

#[test]
fn place_orders_submits_plan_in_target_order() {
    let broker = market().build();
    let confirmer = Typed::new(" CONFIRM \n");

    let outcome = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: true }),
        &confirmer,
    )
    .unwrap();

    assert_eq!(confirmer.asked.get(), 1);
    let Outcome::Placed { report, orders } = outcome else {
        panic!("expected orders to be placed");
    };
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].symbol, vcn());
    assert_eq!(orders[0].shares, 49);
    assert_eq!(orders[1].symbol, xuu());
    assert_eq!(orders[1].shares, 25);
    assert!(report.cost.total <= 1_000.0);

    let placed = broker.placed_orders();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].symbol_id, SymbolId(8049));
    assert_eq!(placed[0].limit_price, 10.0);
    assert_eq!(placed[0].account_number, ACCOUNT);
    assert_eq!(placed[0].action, BrokerSide::Buy);
    assert_eq!(placed[0].order_type, OrderType::Limit);
    assert_eq!(placed[0].time_in_force, TimeInForce::Day);
}

#[test]
fn show_orders_validates_but_never_submits() {
    let broker = market().build();
    let confirmer = Typed::new(CONFIRMATION_WORD);

    let outcome =
        execution::run(&broker, &config(), &request(Mode::Show), &confirmer).unwrap();

    assert!(matches!(outcome, Outcome::Shown(_)));
    assert_eq!(broker.open_order_queries(), 1);
    assert_eq!(confirmer.asked.get(), 0);
    assert!(broker.placed_orders().is_empty());
}

#[test]
fn show_orders_as_json() {
    let broker = market().build();
    let mut req = request(Mode::Show);
    req.json = true;

    let outcome = execution::run(&broker, &config(), &req, &Typed::new("")).unwrap();
    let Outcome::Shown(report) = outcome else {
        panic!("expected the plan to be shown");
    };
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(value["orders"][0]["symbol"], "VCN.TO");
    assert_eq!(value["orders"][0]["shares"], 49);
    assert_eq!(value["orders"][1]["shares"], 25);
    assert!(broker.placed_orders().is_empty());
}

#[test]
fn no_confirm_skips_prompt() {
    let broker = market().build();
    let confirmer = Typed::new("nope");

    let outcome = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: false }),
        &confirmer,
    )
    .unwrap();

    assert!(matches!(outcome, Outcome::Placed { .. }));
    assert_eq!(confirmer.asked.get(), 0);
    assert_eq!(broker.placed_orders().len(), 2);
}

#[test]
fn dca_override_spends_a_fraction() {
    let broker = market().build();
    let mut req = request(Mode::Place { confirm: false });
    req.dca = Some(4.0);

    execution::run(&broker, &config(), &req, &Typed::new("")).unwrap();

    let spent: f64 = broker
        .placed_orders()
        .iter()
        .map(|o| o.quantity as f64 * (o.limit_price + 0.0035))
        .sum();
    assert!(spent <= 250.0);
    assert!(spent > 200.0);
}

// ============================================================================
// Nothing to do
// ============================================================================

#[test]
fn zero_cash_is_nothing_to_do() {
    let broker = MockBroker::builder()
        .with_balance("CAD", 0.0)
        .with_symbol("VCN.TO", 8049, Some(10.0))
        .with_symbol("XUU.TO", 24530541, Some(20.0))
        .build();

    let outcome = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: true }),
        &Typed::new(CONFIRMATION_WORD),
    )
    .unwrap();

    assert!(matches!(
        outcome,
        Outcome::NothingToDo(Termination::CashExhausted)
    ));
    assert_eq!(broker.open_order_queries(), 0);
    assert!(broker.placed_orders().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn open_order_conflict_places_nothing() {
    let broker = market().with_open_order("XUU.TO").build();
    let confirmer = Typed::new(CONFIRMATION_WORD);

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: true }),
        &confirmer,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::ExistingOrderConflict { ref symbol, .. } if *symbol == xuu()
    ));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(confirmer.asked.get(), 0);
    assert!(broker.placed_orders().is_empty());
}

#[test]
fn open_order_on_other_symbol_is_fine() {
    let broker = market().with_symbol("ZAG.TO", 40825, Some(14.0)).with_open_order("ZAG.TO").build();

    let outcome = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: false }),
        &Typed::new(""),
    )
    .unwrap();
    assert!(matches!(outcome, Outcome::Placed { .. }));
}

#[test]
fn rejection_stops_and_earlier_orders_stand() {
    let broker = market()
        .reject_mode(RejectMode::RejectSymbol(xuu(), "Outside trading hours".into()))
        .build();

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: false }),
        &Typed::new(""),
    )
    .unwrap_err();

    match err {
        Error::Rejected {
            shares,
            symbol,
            price,
            account,
            reason,
        } => {
            assert_eq!(shares, 25);
            assert_eq!(symbol, xuu());
            assert_eq!(price, 20.0);
            assert_eq!(account, ACCOUNT);
            assert_eq!(reason, "Outside trading hours");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // VCN.TO was placed first and is not rolled back; nothing after XUU.TO is tried.
    let placed = broker.placed_orders();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].symbol, vcn());
    assert_eq!(placed[1].symbol, xuu());
}

#[test]
fn first_rejection_stops_everything() {
    let broker = market()
        .reject_mode(RejectMode::RejectAll("Insufficient buying power".into()))
        .build();

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: false }),
        &Typed::new(""),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Rejected { ref symbol, .. } if *symbol == vcn()));
    assert_eq!(broker.placed_orders().len(), 1);
}

#[test]
fn confirmation_mismatch_places_nothing() {
    let broker = market().build();

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: true }),
        &Typed::new("confirm"),
    )
    .unwrap_err();

    assert!(matches!(err, Error::ConfirmationMismatch));
    assert_eq!(err.exit_code(), 1);
    assert!(broker.placed_orders().is_empty());
}

#[test]
fn closed_market_aborts_before_any_plan() {
    let broker = MockBroker::builder()
        .with_balance("CAD", 1_000.0)
        .with_symbol("VCN.TO", 8049, Some(10.0))
        .with_symbol("XUU.TO", 24530541, None)
        .build();

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Place { confirm: false }),
        &Typed::new(""),
    )
    .unwrap_err();

    assert!(matches!(err, Error::DataUnavailable(ref msg) if msg.contains("XUU.TO")));
    assert_eq!(broker.open_order_queries(), 0);
    assert!(broker.placed_orders().is_empty());
}

#[test]
fn network_failure_aborts_the_run() {
    let broker = market().fail_quotes().build();

    let err = execution::run(
        &broker,
        &config(),
        &request(Mode::Show),
        &Typed::new(""),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
}

#[test]
fn unknown_account_type() {
    let broker = market().build();
    let mut req = request(Mode::Show);
    req.account_type = "RESP".into();

    let err = execution::run(&broker, &config(), &req, &Typed::new("")).unwrap_err();
    assert!(matches!(err, Error::UnknownAccountType(t) if t == "RESP"));
}

#[test]
fn invalid_dca_override() {
    let broker = market().build();
    let mut req = request(Mode::Show);
    req.dca = Some(0.5);

    let err = execution::run(&broker, &config(), &req, &Typed::new("")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn list_accounts_returns_all() {
    let broker = market().with_account("RRSP", "51234568").build();
    let accounts = execution::list_accounts(&broker).unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].account_type, "RRSP");
}
