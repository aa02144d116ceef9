//! Account snapshot: cash, target position values, symbol ids and ask quotes.

use log::{debug, info};
use rustc_hash::FxHashMap;
use wholeshare::{PositionValues, Quotes, Symbol, TargetAllocation};
use wholeshare_broker::{Broker, SymbolId};

use crate::error::{Error, Result};

/// Everything the allocator needs, fetched in one pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub account: String,
    /// Balance in the configured currency before the dollar-cost-average split.
    pub balance: f64,
    /// Cash available to this run.
    pub cash: f64,
    pub positions: PositionValues,
    pub quotes: Quotes,
    pub symbol_ids: FxHashMap<Symbol, SymbolId>,
}

impl Snapshot {
    /// Fetch balances, positions, symbol ids and quotes, in that order.
    ///
    /// Positions outside `targets` are ignored. Only `balance / dca` of the
    /// cash is made available.
    pub fn fetch<B: Broker + ?Sized>(
        broker: &B,
        account: &str,
        targets: &TargetAllocation,
        currency: &str,
        dca: f64,
    ) -> Result<Self> {
        let balances = broker.balances(account)?;
        let balance = balances
            .iter()
            .find(|b| b.currency == currency)
            .map(|b| b.cash)
            .ok_or_else(|| {
                Error::DataUnavailable(format!("no {currency} balance on account {account}"))
            })?;
        let cash = balance / dca;
        info!("Account {account}: {currency} cash {balance:.2}, using {cash:.2}");

        let mut positions = PositionValues::for_targets(targets);
        for position in broker.positions(account)? {
            if !targets.contains(&position.symbol) {
                debug!("Ignoring non-target position {}", position.symbol);
                continue;
            }
            let value = position.market_value.ok_or_else(|| {
                Error::DataUnavailable(format!(
                    "no market value for position {} (the market is most likely closed)",
                    position.symbol
                ))
            })?;
            positions.set(&position.symbol, value);
        }

        let mut symbol_ids = FxHashMap::default();
        let mut by_id = FxHashMap::default();
        for symbol in targets.symbols() {
            let id = broker.symbol_id(symbol)?;
            debug!("Resolved {symbol} to symbol id {id}");
            symbol_ids.insert(symbol.clone(), id);
            by_id.insert(id, symbol.clone());
        }

        let ids: Vec<SymbolId> = targets
            .symbols()
            .filter_map(|s| symbol_ids.get(s).copied())
            .collect();
        let mut quotes = Quotes::new();
        for quote in broker.quotes(&ids)? {
            match by_id.get(&quote.symbol_id) {
                Some(symbol) => quotes.insert(symbol.clone(), quote.ask),
                None => debug!("Ignoring quote for unrequested id {}", quote.symbol_id),
            }
        }

        Ok(Self {
            account: account.to_string(),
            balance,
            cash,
            positions,
            quotes,
            symbol_ids,
        })
    }
}
