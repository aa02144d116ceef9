//! Questrade-specific API request and response types.

use serde::{Deserialize, Serialize};

use crate::types::OrderRequest;

/// OAuth refresh-token exchange response.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub api_server: String,
}

/// Account entry from `GET v1/accounts`.
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "type")]
    pub account_type: String,
    pub number: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountInfo>,
}

/// Cash in one currency from `GET v1/accounts/{id}/balances`.
#[derive(Debug, Deserialize)]
pub struct CurrencyBalanceInfo {
    pub currency: String,
    pub cash: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub per_currency_balances: Vec<CurrencyBalanceInfo>,
}

/// Holding from `GET v1/accounts/{id}/positions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    pub symbol: String,
    pub symbol_id: u64,
    #[serde(default)]
    pub current_market_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PositionsResponse {
    pub positions: Vec<PositionInfo>,
}

/// Match from `GET v1/symbols?names=`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub symbol_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<SymbolInfo>,
}

/// Level 1 quote from `GET v1/markets/quotes?ids=`. The ask is null outside market hours.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInfo {
    pub symbol: String,
    pub symbol_id: u64,
    #[serde(default)]
    pub ask_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct QuotesResponse {
    pub quotes: Vec<QuoteInfo>,
}

/// Order from `GET v1/accounts/{id}/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub id: u64,
    pub symbol: String,
    pub symbol_id: u64,
    pub state: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderInfo>,
}

/// Body of `POST v1/accounts/{id}/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub account_number: String,
    pub symbol_id: u64,
    pub quantity: u64,
    pub limit_price: f64,
    pub is_all_or_none: bool,
    pub is_anonymous: bool,
    pub order_type: &'static str,
    pub time_in_force: &'static str,
    pub action: &'static str,
    pub primary_route: String,
    pub secondary_route: String,
}

impl From<&OrderRequest> for PlaceOrderRequest {
    fn from(order: &OrderRequest) -> Self {
        Self {
            account_number: order.account_number.clone(),
            symbol_id: order.symbol_id.0,
            quantity: order.quantity,
            limit_price: order.limit_price,
            is_all_or_none: order.all_or_none,
            is_anonymous: order.anonymous,
            order_type: order.order_type.as_str(),
            time_in_force: order.time_in_force.as_str(),
            action: order.action.as_str(),
            primary_route: order.primary_route.clone(),
            secondary_route: order.secondary_route.clone(),
        }
    }
}

/// Order entry in the place-order response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderResponse {
    pub orders: Vec<PlacedOrderInfo>,
}
