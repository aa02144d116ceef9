//! Core types: Symbol

use std::fmt;

/// Longest ticker accepted, in bytes (e.g. `"BRK.B.TO"` fits comfortably).
pub const MAX_SYMBOL_LEN: usize = 16;

/// A tradable ticker as the brokerage spells it (e.g. `"VCN.TO"`).
///
/// Tickers are compared byte-for-byte; no case folding is applied, since the
/// brokerage treats `"vcn.to"` and `"VCN.TO"` as different names.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, panicking on an invalid ticker.
    ///
    /// Intended for constants and tests; use [`Symbol::try_new`] for input.
    #[track_caller]
    pub fn new(s: &str) -> Self {
        match Self::try_new(s) {
            Some(sym) => sym,
            None => panic!("invalid symbol: {s:?}"),
        }
    }

    /// Create a symbol, returning `None` if the ticker is empty, contains
    /// whitespace, or is longer than [`MAX_SYMBOL_LEN`] bytes.
    pub fn try_new(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > MAX_SYMBOL_LEN || s.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Symbol(s.to_string()))
    }

    /// The ticker as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
