//! Snapshot data model: target weights, current position values, and ask quotes.
//!
//! All amounts are plain `f64` currency units. Nothing here rounds; display
//! rounding belongs to whoever prints the numbers.

use rustc_hash::FxHashMap;

use crate::Symbol;
use crate::error::TargetError;

/// Desired weight per symbol, in configuration order.
///
/// Weights are percentages of an implicit whole and need not sum to exactly
/// 100. The order symbols were supplied in is kept and is the enumeration
/// order every consumer uses, which makes tie-breaking in the allocator
/// deterministic.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetAllocation {
    entries: Vec<(Symbol, f64)>,
}

impl TargetAllocation {
    /// Build a target allocation, rejecting empty lists, duplicate symbols,
    /// and weights that are not strictly positive finite numbers.
    pub fn new(entries: Vec<(Symbol, f64)>) -> Result<Self, TargetError> {
        if entries.is_empty() {
            return Err(TargetError::Empty);
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for (symbol, weight) in &entries {
            if !seen.insert(symbol) {
                return Err(TargetError::DuplicateSymbol(symbol.clone()));
            }
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(TargetError::NonPositiveWeight {
                    symbol: symbol.clone(),
                    weight: *weight,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Iterate `(symbol, weight)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.entries.iter().map(|(s, w)| (s, *w))
    }

    /// Symbols in configuration order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|(s, _)| s)
    }

    /// Target weight for `symbol`, if it is part of the allocation.
    pub fn weight(&self, symbol: &Symbol) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, w)| *w)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.iter().any(|(s, _)| s == symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed allocation; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights (100 for a fully specified allocation).
    pub fn weight_sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

/// Current market value held per target symbol.
///
/// Every target symbol is present, defaulting to zero. Symbols outside the
/// target allocation are ignored, so they never count toward the total.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionValues {
    values: FxHashMap<Symbol, f64>,
}

impl PositionValues {
    /// Zero-valued positions for every symbol in `targets`.
    pub fn for_targets(targets: &TargetAllocation) -> Self {
        Self {
            values: targets.symbols().map(|s| (s.clone(), 0.0)).collect(),
        }
    }

    /// Record the market value held in `symbol`.
    ///
    /// Returns `false` (and records nothing) when `symbol` is not a target
    /// symbol. Negative or non-finite values are clamped to zero.
    pub fn set(&mut self, symbol: &Symbol, value: f64) -> bool {
        match self.values.get_mut(symbol) {
            Some(slot) => {
                *slot = if value.is_finite() { value.max(0.0) } else { 0.0 };
                true
            }
            None => false,
        }
    }

    /// Value held in `symbol` (zero when unknown).
    pub fn get(&self, symbol: &Symbol) -> f64 {
        self.values.get(symbol).copied().unwrap_or(0.0)
    }

    /// Total value across target symbols.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

/// Ask price per symbol. A missing entry or `None` means the quote is unavailable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Quotes {
    asks: FxHashMap<Symbol, Option<f64>>,
}

impl Quotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ask for `symbol`; `None` marks it unavailable.
    pub fn insert(&mut self, symbol: Symbol, ask: Option<f64>) {
        self.asks.insert(symbol, ask);
    }

    /// Builder-style [`Quotes::insert`].
    pub fn with(mut self, symbol: Symbol, ask: Option<f64>) -> Self {
        self.insert(symbol, ask);
        self
    }

    /// Usable ask price for `symbol`: present, finite, and strictly positive.
    pub fn ask(&self, symbol: &Symbol) -> Option<f64> {
        self.asks
            .get(symbol)
            .copied()
            .flatten()
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn is_available(&self, symbol: &Symbol) -> bool {
        self.ask(symbol).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn keeps_configuration_order() {
        let targets = TargetAllocation::new(vec![
            (sym("XUU.TO"), 30.0),
            (sym("VCN.TO"), 30.0),
            (sym("ZAG.TO"), 40.0),
        ])
        .unwrap();
        let order: Vec<&str> = targets.symbols().map(Symbol::as_str).collect();
        assert_eq!(order, ["XUU.TO", "VCN.TO", "ZAG.TO"]);
        assert_eq!(targets.weight_sum(), 100.0);
        assert_eq!(targets.weight(&sym("ZAG.TO")), Some(40.0));
        assert_eq!(targets.weight(&sym("XEF.TO")), None);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(TargetAllocation::new(vec![]), Err(TargetError::Empty));
    }

    #[test]
    fn rejects_duplicates() {
        let err = TargetAllocation::new(vec![(sym("A"), 50.0), (sym("A"), 50.0)]).unwrap_err();
        assert_eq!(err, TargetError::DuplicateSymbol(sym("A")));
    }

    #[test]
    fn rejects_non_positive_weights() {
        for weight in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(TargetAllocation::new(vec![(sym("A"), weight)]).is_err());
        }
    }

    #[test]
    fn positions_ignore_non_target_symbols() {
        let targets = TargetAllocation::new(vec![(sym("A"), 60.0), (sym("B"), 40.0)]).unwrap();
        let mut positions = PositionValues::for_targets(&targets);
        assert!(positions.set(&sym("A"), 1_500.0));
        assert!(!positions.set(&sym("Z"), 9_999.0));
        assert_eq!(positions.get(&sym("A")), 1_500.0);
        assert_eq!(positions.get(&sym("B")), 0.0);
        assert_eq!(positions.get(&sym("Z")), 0.0);
        assert_eq!(positions.total(), 1_500.0);
    }

    #[test]
    fn quotes_treat_bad_prices_as_unavailable() {
        let quotes = Quotes::new()
            .with(sym("A"), Some(10.0))
            .with(sym("B"), None)
            .with(sym("C"), Some(0.0))
            .with(sym("D"), Some(f64::NAN));
        assert_eq!(quotes.ask(&sym("A")), Some(10.0));
        assert!(!quotes.is_available(&sym("B")));
        assert!(!quotes.is_available(&sym("C")));
        assert!(!quotes.is_available(&sym("D")));
        assert!(!quotes.is_available(&sym("E")));
    }
}
