//! Technical indicator implementations.
//!
//! Every indicator takes a close-price series and returns an [`IndicatorSeries`]
//! aligned index-for-index with it. Warm-up positions hold `None`; a defined
//! reading is always `Some`, so no numeric value doubles as "absent".
//!
//! - `IndicatorValue`: the shape of one reading (single line or band triple)
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: the aligned sequence of optional readings

pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;

use serde::Serialize;
use std::fmt;

use crate::domain::error::BarlabError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

impl IndicatorValue {
    /// The line a price is compared against: the value itself, or the middle band.
    pub fn primary(&self) -> f64 {
        match *self {
            IndicatorValue::Simple(v) => v,
            IndicatorValue::Bollinger { middle, .. } => middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Lower-case short name, used in signal reasons.
    pub fn short_name(&self) -> &'static str {
        match self {
            IndicatorType::Sma(_) => "sma",
            IndicatorType::Ema(_) => "ema",
            IndicatorType::Rsi(_) => "rsi",
            IndicatorType::Bollinger { .. } => "bb",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<IndicatorValue>>,
}

impl IndicatorSeries {
    pub(crate) fn absent(indicator_type: IndicatorType, len: usize) -> Self {
        IndicatorSeries {
            indicator_type,
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Primary line per position (see [`IndicatorValue::primary`]).
    pub fn primary(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|v| v.map(|v| v.primary())).collect()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

pub(crate) fn require_period(name: &str, period: usize) -> Result<(), BarlabError> {
    if period == 0 {
        return Err(BarlabError::invalid_parameter(name, "period must be > 0"));
    }
    Ok(())
}
