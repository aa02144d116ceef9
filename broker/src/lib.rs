//! Brokerage trait and implementations for wholeshare.
//!
//! Provides a generic `Broker` trait covering the calls a rebalance run needs.
//! Implementations:
//!
//! - **Mock** (always compiled): in-memory broker for tests
//! - **Questrade** (feature `questrade`): Questrade REST API with OAuth refresh tokens

pub mod error;
pub mod mock;
pub mod types;

#[cfg(feature = "questrade")]
pub mod questrade;

pub use error::BrokerError;
pub use types::*;

use wholeshare::Symbol;

/// A blocking brokerage session.
///
/// Every call is a single request; nothing is retried.
pub trait Broker {
    /// List the accounts visible to the session.
    fn accounts(&self) -> Result<Vec<Account>, BrokerError>;

    /// Cash per currency for an account.
    fn balances(&self, account: &str) -> Result<Vec<CurrencyBalance>, BrokerError>;

    /// Current positions for an account.
    fn positions(&self, account: &str) -> Result<Vec<Position>, BrokerError>;

    /// Resolve a ticker to the brokerage's numeric symbol id.
    fn symbol_id(&self, symbol: &Symbol) -> Result<SymbolId, BrokerError>;

    /// Ask-price quotes for a set of symbol ids.
    fn quotes(&self, ids: &[SymbolId]) -> Result<Vec<Quote>, BrokerError>;

    /// Orders on an account, filtered by state.
    fn orders(&self, account: &str, filter: OrderStateFilter)
    -> Result<Vec<OpenOrder>, BrokerError>;

    /// Submit an order. A rejection is reported in the ack, not as an error.
    fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError>;
}

impl<B: Broker + ?Sized> Broker for &B {
    fn accounts(&self) -> Result<Vec<Account>, BrokerError> {
        (**self).accounts()
    }

    fn balances(&self, account: &str) -> Result<Vec<CurrencyBalance>, BrokerError> {
        (**self).balances(account)
    }

    fn positions(&self, account: &str) -> Result<Vec<Position>, BrokerError> {
        (**self).positions(account)
    }

    fn symbol_id(&self, symbol: &Symbol) -> Result<SymbolId, BrokerError> {
        (**self).symbol_id(symbol)
    }

    fn quotes(&self, ids: &[SymbolId]) -> Result<Vec<Quote>, BrokerError> {
        (**self).quotes(ids)
    }

    fn orders(
        &self,
        account: &str,
        filter: OrderStateFilter,
    ) -> Result<Vec<OpenOrder>, BrokerError> {
        (**self).orders(account, filter)
    }

    fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError> {
        (**self).place_order(order)
    }
}
