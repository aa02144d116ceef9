//! The buy order plan handed from allocation to validation and submission.

use crate::Symbol;

/// Whole-share buy quantities per symbol.
///
/// Entries keep the order they were first added in (target-allocation order
/// when produced by the allocator) and every quantity is at least one share.
/// A plan is read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BuyOrderPlan {
    entries: Vec<(Symbol, u64)>,
}

impl BuyOrderPlan {
    /// An empty plan: nothing to buy.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a plan from `(symbol, shares)` pairs.
    ///
    /// Zero-share entries are dropped and repeated symbols are merged into
    /// the position of their first occurrence.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, u64)>,
    {
        let mut merged: Vec<(Symbol, u64)> = Vec::new();
        for (symbol, shares) in entries {
            if shares == 0 {
                continue;
            }
            match merged.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, existing)) => *existing += shares,
                None => merged.push((symbol, shares)),
            }
        }
        Self { entries: merged }
    }

    /// Iterate `(symbol, shares)` in plan order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, u64)> {
        self.entries.iter().map(|(s, n)| (s, *n))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|(s, _)| s)
    }

    /// Shares planned for `symbol` (zero when absent).
    pub fn shares(&self, symbol: &Symbol) -> u64 {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map_or(0, |(_, n)| *n)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.iter().any(|(s, _)| s == symbol)
    }

    /// Number of distinct symbols (one order each).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_shares(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn from_entries_merges_and_drops_zero() {
        let plan = BuyOrderPlan::from_entries([
            (sym("B"), 2),
            (sym("A"), 0),
            (sym("C"), 1),
            (sym("B"), 3),
        ]);
        let entries: Vec<(&str, u64)> = plan.iter().map(|(s, n)| (s.as_str(), n)).collect();
        assert_eq!(entries, [("B", 5), ("C", 1)]);
        assert_eq!(plan.total_shares(), 6);
        assert!(!plan.contains(&sym("A")));
        assert_eq!(plan.shares(&sym("A")), 0);
    }

    #[test]
    fn empty_plan() {
        let plan = BuyOrderPlan::empty();
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
        assert_eq!(plan.total_shares(), 0);
    }
}
