//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Warmup: first (period-1) bars are `None`.

use crate::domain::error::BarlabError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_NUM_STD: f64 = 2.0;

pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Result<IndicatorSeries, BarlabError> {
    require_period("bb_period", period)?;
    if !(num_std >= 0.0 && num_std.is_finite()) {
        return Err(BarlabError::invalid_parameter(
            "bb_std",
            format!("num_std must be >= 0 (got {})", num_std),
        ));
    }

    let middle = calculate_sma(closes, period)?;
    let values = middle
        .values
        .iter()
        .enumerate()
        .map(|(i, mid)| {
            let middle = mid.map(|v| v.primary())?;
            let window = &closes[i + 1 - period..=i];

            let variance = window
                .iter()
                .map(|c| {
                    let diff = c - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            Some(IndicatorValue::Bollinger {
                upper: middle + num_std * stddev,
                middle,
                lower: middle - num_std * stddev,
            })
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (num_std * 100.0).round() as u32,
        },
        values,
    })
}
