//! Questrade broker implementation.

pub mod auth;
pub mod client;
pub mod types;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use wholeshare::Symbol;

use crate::Broker;
use crate::error::BrokerError;
use crate::types::*;
use auth::Credentials;
use client::QuestradeClient;

/// Questrade broker implementing the generic Broker trait.
///
/// Uses the REST API for all operations, blocking via `reqwest::blocking`.
/// The session lives as long as this value.
pub struct QuestradeBroker {
    client: QuestradeClient,
}

impl QuestradeBroker {
    /// Open a session from a credentials file.
    ///
    /// Expired credentials are refreshed when a refresh token is stored, and
    /// the file is rewritten with the new tokens. Expired credentials without
    /// a refresh token are an auth error.
    pub fn connect(
        credentials_path: &Path,
        oauth_url: &str,
        timeout: Duration,
    ) -> Result<Self, BrokerError> {
        let http = client::http_client(timeout)?;
        let mut credentials = Credentials::load(credentials_path)?;

        if credentials.is_expired(Utc::now())? {
            let Some(refresh_token) = credentials.refresh_token.clone() else {
                return Err(BrokerError::Auth(
                    "access token expired and no refresh token is stored; run login".into(),
                ));
            };
            credentials = auth::refresh(&http, oauth_url, &refresh_token)?;
            credentials.save(credentials_path)?;
        }

        let client = QuestradeClient::new(http, &credentials);
        info!("Connected to Questrade API at {}", client.base_url());
        Ok(Self { client })
    }

    /// Exchange a refresh token from the Questrade app hub and store the
    /// resulting credentials.
    pub fn login(
        credentials_path: &Path,
        oauth_url: &str,
        refresh_token: &str,
        timeout: Duration,
    ) -> Result<Credentials, BrokerError> {
        let http = client::http_client(timeout)?;
        let credentials = auth::refresh(&http, oauth_url, refresh_token)?;
        credentials.save(credentials_path)?;
        Ok(credentials)
    }

    fn parse_symbol(raw: &str) -> Result<Symbol, BrokerError> {
        Symbol::try_new(raw).ok_or_else(|| BrokerError::InvalidSymbol(raw.to_string()))
    }
}

impl Broker for QuestradeBroker {
    fn accounts(&self) -> Result<Vec<Account>, BrokerError> {
        let resp = self.client.accounts()?;
        Ok(resp
            .accounts
            .into_iter()
            .map(|a| Account {
                account_type: a.account_type,
                number: a.number,
            })
            .collect())
    }

    fn balances(&self, account: &str) -> Result<Vec<CurrencyBalance>, BrokerError> {
        let resp = self.client.balances(account)?;
        Ok(resp
            .per_currency_balances
            .into_iter()
            .map(|b| CurrencyBalance {
                currency: b.currency,
                cash: b.cash,
            })
            .collect())
    }

    fn positions(&self, account: &str) -> Result<Vec<Position>, BrokerError> {
        let resp = self.client.positions(account)?;
        let positions = resp
            .positions
            .into_iter()
            .filter_map(|p| match Symbol::try_new(&p.symbol) {
                Some(symbol) => Some(Position {
                    symbol,
                    symbol_id: SymbolId(p.symbol_id),
                    market_value: p.current_market_value,
                }),
                None => {
                    warn!("Skipping position with unusable symbol {:?}", p.symbol);
                    None
                }
            })
            .collect();
        Ok(positions)
    }

    fn symbol_id(&self, symbol: &Symbol) -> Result<SymbolId, BrokerError> {
        let resp = self.client.symbols(symbol.as_str())?;
        resp.symbols
            .first()
            .map(|s| SymbolId(s.symbol_id))
            .ok_or_else(|| BrokerError::InvalidSymbol(symbol.as_str().to_string()))
    }

    fn quotes(&self, ids: &[SymbolId]) -> Result<Vec<Quote>, BrokerError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<u64> = ids.iter().map(|id| id.0).collect();
        let resp = self.client.quotes(&raw)?;
        resp.quotes
            .into_iter()
            .map(|q| {
                Ok(Quote {
                    symbol: Self::parse_symbol(&q.symbol)?,
                    symbol_id: SymbolId(q.symbol_id),
                    ask: q.ask_price,
                })
            })
            .collect()
    }

    fn orders(
        &self,
        account: &str,
        filter: OrderStateFilter,
    ) -> Result<Vec<OpenOrder>, BrokerError> {
        let resp = self.client.orders(account, filter.as_str())?;
        resp.orders
            .into_iter()
            .map(|o| {
                Ok(OpenOrder {
                    id: o.id,
                    symbol: Self::parse_symbol(&o.symbol)?,
                    symbol_id: SymbolId(o.symbol_id),
                    state: o.state,
                })
            })
            .collect()
    }

    fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError> {
        let payload = types::PlaceOrderRequest::from(order);
        let resp = self.client.place_order(&order.account_number, &payload)?;
        let placed = resp.orders.into_iter().next().ok_or_else(|| {
            BrokerError::Order(format!("no order returned for {}", order.symbol))
        })?;
        Ok(OrderAck::new(placed.id, placed.rejection_reason))
    }
}
