//! Shared broker types: accounts, balances, positions, quotes, orders.

use std::fmt;

use wholeshare::Symbol;

use crate::error::BrokerError;

/// Brokerage account (e.g. type "TFSA", number "51234567").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_type: String,
    pub number: String,
}

/// Cash held in one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyBalance {
    pub currency: String,
    pub cash: f64,
}

/// Numeric symbol identifier assigned by the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u64);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broker-level position.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: Symbol,
    pub symbol_id: SymbolId,
    /// `None` when the brokerage has no current price for the holding.
    pub market_value: Option<f64>,
}

/// Live ask quote. `ask` is `None` when the market is closed or the symbol is halted.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: Symbol,
    pub symbol_id: SymbolId,
    pub ask: Option<f64>,
}

/// Order as listed by the brokerage.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: u64,
    pub symbol: Symbol,
    pub symbol_id: SymbolId,
    pub state: String,
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStateFilter {
    All,
    Open,
    Closed,
}

impl OrderStateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStateFilter::All => "All",
            OrderStateFilter::Open => "Open",
            OrderStateFilter::Closed => "Closed",
        }
    }
}

/// Order side. The rebalancer only buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerSide {
    Buy,
}

impl BrokerSide {
    pub fn as_str(self) -> &'static str {
        match self {
            BrokerSide::Buy => "Buy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Limit,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Limit => "Limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInForce {
    Day,
}

impl TimeInForce {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInForce::Day => "Day",
        }
    }
}

/// Order to submit to a broker.
///
/// Build buy orders with [`OrderRequest::limit_buy`]; the remaining fields
/// carry the fixed routing the rebalancer always uses.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub account_number: String,
    pub symbol_id: SymbolId,
    pub symbol: Symbol,
    pub quantity: u64,
    pub limit_price: f64,
    pub action: BrokerSide,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub all_or_none: bool,
    pub anonymous: bool,
    pub primary_route: String,
    pub secondary_route: String,
}

impl OrderRequest {
    /// A day limit buy routed `AUTO`.
    ///
    /// Fails with [`BrokerError::InvalidOrder`] on a zero quantity or a limit
    /// price that is not finite and positive.
    pub fn limit_buy(
        account_number: &str,
        symbol: Symbol,
        symbol_id: SymbolId,
        quantity: u64,
        limit_price: f64,
    ) -> Result<Self, BrokerError> {
        if quantity == 0 {
            return Err(BrokerError::InvalidOrder(format!(
                "zero quantity for {symbol}"
            )));
        }
        if !limit_price.is_finite() || limit_price <= 0.0 {
            return Err(BrokerError::InvalidOrder(format!(
                "limit price {limit_price} for {symbol}"
            )));
        }
        Ok(Self {
            account_number: account_number.to_string(),
            symbol_id,
            symbol,
            quantity,
            limit_price,
            action: BrokerSide::Buy,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Day,
            all_or_none: false,
            anonymous: false,
            primary_route: "AUTO".to_string(),
            secondary_route: "AUTO".to_string(),
        })
    }
}

/// Brokerage response to a submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: Option<u64>,
    pub rejection_reason: Option<String>,
}

impl OrderAck {
    /// An empty or blank rejection reason means the order was accepted.
    pub fn new(order_id: Option<u64>, rejection_reason: Option<String>) -> Self {
        let rejection_reason = rejection_reason.filter(|r| !r.trim().is_empty());
        Self {
            order_id,
            rejection_reason,
        }
    }

    pub fn accepted(order_id: u64) -> Self {
        Self::new(Some(order_id), None)
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection_reason.is_some()
    }
}
