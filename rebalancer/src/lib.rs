//! wholeshare-rebalancer: whole-share buy-only rebalancer for Questrade accounts.
//!
//! Reads target weights per account type from a TOML file, fetches cash,
//! positions and ask quotes from the brokerage, sizes a whole-share buy plan
//! with the wholeshare allocator, validates it, and places day limit orders
//! after an explicit confirmation.

pub mod broker;
pub mod config;
pub mod error;
pub mod execution;
pub mod report;
pub mod snapshot;
pub mod target;
