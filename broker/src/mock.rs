//! Mock broker for testing: implements the `Broker` trait with configurable behavior.
//!
//! Use this in integration tests to simulate brokerage responses without network calls.
//!
//! ```
//! use wholeshare::Symbol;
//! use wholeshare_broker::Broker;
//! use wholeshare_broker::mock::{MockBroker, RejectMode};
//!
//! let broker = MockBroker::builder()
//!     .with_account("TFSA", "51234567")
//!     .with_balance("CAD", 1_000.0)
//!     .with_symbol("XUU.TO", 11, Some(40.0))
//!     .reject_mode(RejectMode::AcceptAll)
//!     .build();
//!
//! let id = broker.symbol_id(&Symbol::new("XUU.TO")).unwrap();
//! assert_eq!(broker.quotes(&[id]).unwrap()[0].ask, Some(40.0));
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use wholeshare::Symbol;

use crate::Broker;
use crate::error::BrokerError;
use crate::types::*;

/// How the mock broker answers submitted orders.
#[derive(Clone, Debug, Default)]
pub enum RejectMode {
    /// Every order is accepted.
    #[default]
    AcceptAll,
    /// Every order is rejected with the given reason.
    RejectAll(String),
    /// Orders for one symbol are rejected with the given reason.
    RejectSymbol(Symbol, String),
}

#[derive(Clone, Debug)]
struct MockSymbol {
    symbol: Symbol,
    id: SymbolId,
    ask: Option<f64>,
}

/// Builder for `MockBroker`.
#[derive(Default)]
pub struct MockBrokerBuilder {
    reject_mode: RejectMode,
    accounts: Vec<Account>,
    balances: Vec<CurrencyBalance>,
    positions: Vec<Position>,
    symbols: Vec<MockSymbol>,
    open_orders: Vec<OpenOrder>,
    fail_quotes: bool,
}

impl MockBrokerBuilder {
    pub fn reject_mode(mut self, mode: RejectMode) -> Self {
        self.reject_mode = mode;
        self
    }

    pub fn with_account(mut self, account_type: &str, number: &str) -> Self {
        self.accounts.push(Account {
            account_type: account_type.to_string(),
            number: number.to_string(),
        });
        self
    }

    /// Cash in `currency`, reported for every account.
    pub fn with_balance(mut self, currency: &str, cash: f64) -> Self {
        self.balances.push(CurrencyBalance {
            currency: currency.to_string(),
            cash,
        });
        self
    }

    /// Register a ticker with its id and ask price (`None` = market closed).
    pub fn with_symbol(mut self, symbol: &str, id: u64, ask: Option<f64>) -> Self {
        self.symbols.push(MockSymbol {
            symbol: Symbol::new(symbol),
            id: SymbolId(id),
            ask,
        });
        self
    }

    /// Add a holding. The symbol id is taken from a registered symbol, or 0.
    pub fn with_position(mut self, symbol: &str, market_value: Option<f64>) -> Self {
        let symbol = Symbol::new(symbol);
        let symbol_id = self.id_of(&symbol).unwrap_or(SymbolId(0));
        self.positions.push(Position {
            symbol,
            symbol_id,
            market_value,
        });
        self
    }

    pub fn with_open_order(mut self, symbol: &str) -> Self {
        let symbol = Symbol::new(symbol);
        let symbol_id = self.id_of(&symbol).unwrap_or(SymbolId(0));
        let id = 1_000 + self.open_orders.len() as u64;
        self.open_orders.push(OpenOrder {
            id,
            symbol,
            symbol_id,
            state: "Pending".to_string(),
        });
        self
    }

    /// Make every quote request fail with a connection error.
    pub fn fail_quotes(mut self) -> Self {
        self.fail_quotes = true;
        self
    }

    fn id_of(&self, symbol: &Symbol) -> Option<SymbolId> {
        self.symbols
            .iter()
            .find(|s| &s.symbol == symbol)
            .map(|s| s.id)
    }

    pub fn build(self) -> MockBroker {
        MockBroker {
            reject_mode: self.reject_mode,
            accounts: self.accounts,
            balances: self.balances,
            positions: self.positions,
            symbols: self.symbols,
            open_orders: self.open_orders,
            fail_quotes: self.fail_quotes,
            next_order_id: AtomicU64::new(1),
            placed_orders: Mutex::new(Vec::new()),
            open_order_queries: AtomicUsize::new(0),
        }
    }
}

/// A mock broker that records placed orders and returns configurable responses.
pub struct MockBroker {
    reject_mode: RejectMode,
    accounts: Vec<Account>,
    balances: Vec<CurrencyBalance>,
    positions: Vec<Position>,
    symbols: Vec<MockSymbol>,
    open_orders: Vec<OpenOrder>,
    fail_quotes: bool,
    next_order_id: AtomicU64,
    placed_orders: Mutex<Vec<OrderRequest>>,
    open_order_queries: AtomicUsize,
}

impl MockBroker {
    pub fn builder() -> MockBrokerBuilder {
        MockBrokerBuilder::default()
    }

    /// Every order passed to `place_order`, accepted or rejected, in call order.
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed_orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of `orders` calls made so far.
    pub fn open_order_queries(&self) -> usize {
        self.open_order_queries.load(Ordering::Relaxed)
    }

    fn rejection_for(&self, order: &OrderRequest) -> Option<String> {
        match &self.reject_mode {
            RejectMode::AcceptAll => None,
            RejectMode::RejectAll(reason) => Some(reason.clone()),
            RejectMode::RejectSymbol(symbol, reason) if *symbol == order.symbol => {
                Some(reason.clone())
            }
            RejectMode::RejectSymbol(..) => None,
        }
    }
}

impl Broker for MockBroker {
    fn accounts(&self) -> Result<Vec<Account>, BrokerError> {
        Ok(self.accounts.clone())
    }

    fn balances(&self, _account: &str) -> Result<Vec<CurrencyBalance>, BrokerError> {
        Ok(self.balances.clone())
    }

    fn positions(&self, _account: &str) -> Result<Vec<Position>, BrokerError> {
        Ok(self.positions.clone())
    }

    fn symbol_id(&self, symbol: &Symbol) -> Result<SymbolId, BrokerError> {
        self.symbols
            .iter()
            .find(|s| &s.symbol == symbol)
            .map(|s| s.id)
            .ok_or_else(|| BrokerError::InvalidSymbol(symbol.as_str().to_string()))
    }

    fn quotes(&self, ids: &[SymbolId]) -> Result<Vec<Quote>, BrokerError> {
        if self.fail_quotes {
            return Err(BrokerError::Connection("mock: quote request failed".into()));
        }
        ids.iter()
            .map(|id| {
                self.symbols
                    .iter()
                    .find(|s| s.id == *id)
                    .map(|s| Quote {
                        symbol: s.symbol.clone(),
                        symbol_id: s.id,
                        ask: s.ask,
                    })
                    .ok_or_else(|| BrokerError::InvalidSymbol(format!("id {id}")))
            })
            .collect()
    }

    fn orders(
        &self,
        _account: &str,
        filter: OrderStateFilter,
    ) -> Result<Vec<OpenOrder>, BrokerError> {
        self.open_order_queries.fetch_add(1, Ordering::Relaxed);
        match filter {
            OrderStateFilter::Open | OrderStateFilter::All => Ok(self.open_orders.clone()),
            OrderStateFilter::Closed => Ok(Vec::new()),
        }
    }

    fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError> {
        self.placed_orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(order.clone());

        match self.rejection_for(order) {
            Some(reason) => Ok(OrderAck::new(None, Some(reason))),
            None => Ok(OrderAck::accepted(
                self.next_order_id.fetch_add(1, Ordering::Relaxed),
            )),
        }
    }
}
