//! Questrade REST API client.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use zeroize::Zeroize;

use super::auth::Credentials;
use super::types::{
    AccountsResponse, BalancesResponse, OrdersResponse, PlaceOrderRequest, PlaceOrderResponse,
    PositionsResponse, QuotesResponse, SymbolsResponse,
};
use crate::error::BrokerError;

/// Build the blocking HTTP client shared by the token exchange and the API calls.
pub fn http_client(timeout: Duration) -> Result<Client, BrokerError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BrokerError::Connection(format!("failed to build HTTP client: {e}")))
}

/// Blocking Questrade REST client bound to one access token.
pub struct QuestradeClient {
    client: Client,
    base_url: String,
    authorization: String,
}

impl QuestradeClient {
    pub fn new(client: Client, credentials: &Credentials) -> Self {
        Self {
            client,
            base_url: credentials.base_url(),
            authorization: credentials.authorization(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List accounts (GET v1/accounts).
    pub fn accounts(&self) -> Result<AccountsResponse, BrokerError> {
        self.get("v1/accounts", "accounts")
    }

    /// Per-currency balances (GET v1/accounts/{id}/balances).
    pub fn balances(&self, account: &str) -> Result<BalancesResponse, BrokerError> {
        self.get(&format!("v1/accounts/{account}/balances"), "balances")
    }

    /// Positions (GET v1/accounts/{id}/positions).
    pub fn positions(&self, account: &str) -> Result<PositionsResponse, BrokerError> {
        self.get(&format!("v1/accounts/{account}/positions"), "positions")
    }

    /// Symbol search by exact ticker (GET v1/symbols?names=).
    pub fn symbols(&self, names: &str) -> Result<SymbolsResponse, BrokerError> {
        self.get(&format!("v1/symbols?names={names}"), "symbols")
    }

    /// Level 1 quotes (GET v1/markets/quotes?ids=).
    pub fn quotes(&self, ids: &[u64]) -> Result<QuotesResponse, BrokerError> {
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.get(&format!("v1/markets/quotes?ids={ids}"), "quotes")
    }

    /// Orders filtered by state (GET v1/accounts/{id}/orders?stateFilter=).
    pub fn orders(&self, account: &str, state: &str) -> Result<OrdersResponse, BrokerError> {
        self.get(
            &format!("v1/accounts/{account}/orders?stateFilter={state}"),
            "orders",
        )
    }

    /// Place an order (POST v1/accounts/{id}/orders).
    pub fn place_order(
        &self,
        account: &str,
        order: &PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, BrokerError> {
        let url = format!("{}v1/accounts/{account}/orders", self.base_url);

        debug!(
            "Submitting Questrade order: {}",
            serde_json::to_string(order).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.authorization)
            .json(order)
            .send()
            .map_err(|e| BrokerError::Order(format!("order request failed: {e}")))?;

        let resp = check_status(resp, "order", BrokerError::Order)?;
        resp.json::<PlaceOrderResponse>()
            .map_err(|e| BrokerError::Order(format!("failed to parse order response: {e}")))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, BrokerError> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.authorization)
            .send()
            .map_err(|e| BrokerError::Connection(format!("{what} request failed: {e}")))?;

        let resp = check_status(resp, what, BrokerError::Connection)?;
        resp.json::<T>()
            .map_err(|e| BrokerError::Connection(format!("failed to parse {what}: {e}")))
    }
}

impl Drop for QuestradeClient {
    fn drop(&mut self) {
        self.authorization.zeroize();
    }
}

/// Map a non-2xx response to a broker error.
///
/// 401 is an auth failure and 429 a rate limit; anything else goes through `other`.
fn check_status(
    resp: Response,
    what: &str,
    other: fn(String) -> BrokerError,
) -> Result<Response, BrokerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(status_error(status, what, &body, other))
}

fn status_error(
    status: StatusCode,
    what: &str,
    body: &str,
    other: fn(String) -> BrokerError,
) -> BrokerError {
    match status {
        StatusCode::UNAUTHORIZED => BrokerError::Auth(format!("{what} returned {status}: {body}")),
        StatusCode::TOO_MANY_REQUESTS => BrokerError::RateLimit,
        _ => other(format!("{what} returned {status}: {body}")),
    }
}
