//! Daily price bar representation and sequence checks.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BarlabError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

/// Closing prices, index-aligned with `bars`.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn dates(bars: &[PriceBar]) -> Vec<NaiveDate> {
    bars.iter().map(|b| b.date).collect()
}

/// Fails with `InvalidInput` unless every date is strictly later than the one before it.
pub fn ensure_ascending(dates: &[NaiveDate]) -> Result<(), BarlabError> {
    match dates.windows(2).position(|w| w[0] >= w[1]) {
        Some(i) => Err(BarlabError::invalid_input(format!(
            "dates must be strictly ascending ({} then {} at index {})",
            dates[i],
            dates[i + 1],
            i + 1
        ))),
        None => Ok(()),
    }
}

/// Checks the preconditions every pipeline stage relies on:
/// non-empty, strictly ascending by date, every close finite and > 0.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), BarlabError> {
    if bars.is_empty() {
        return Err(BarlabError::invalid_input("bars must be non-empty"));
    }

    if let Some(bar) = bars.iter().find(|b| !(b.close.is_finite() && b.close > 0.0)) {
        return Err(BarlabError::invalid_input(format!(
            "close must be > 0 (got {} on {})",
            bar.close, bar.date
        )));
    }

    ensure_ascending(&dates(bars))
}
