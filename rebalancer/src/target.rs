//! Target allocation entries from the config file.

use serde::Deserialize;
use wholeshare::{Symbol, TargetAllocation, TargetError};

/// A single target: ticker and percentage weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetEntry {
    pub symbol: String,
    pub weight: f64,
}

/// Targets for one account type, in the order they are listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountTargets {
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

impl AccountTargets {
    /// Convert to the core `TargetAllocation`, keeping the listed order.
    pub fn to_allocation(&self) -> Result<TargetAllocation, TargetError> {
        let entries = self
            .targets
            .iter()
            .map(|t| {
                Symbol::try_new(&t.symbol)
                    .map(|s| (s, t.weight))
                    .ok_or_else(|| TargetError::InvalidSymbol(t.symbol.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        TargetAllocation::new(entries)
    }
}
