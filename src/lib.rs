//! barlab: single-instrument indicator and backtest engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the command-line boundary in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
