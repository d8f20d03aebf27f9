//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of the first n price changes (bars 1..=n)
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_gain == avg_loss == 0: RSI = 50. If only avg_loss == 0: RSI = 100.
//!
//! Warmup: first n bars are `None` (need n price changes for the initial average).

use crate::domain::error::BarlabError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<IndicatorSeries, BarlabError> {
    require_period("rsi_period", period)?;

    let n = closes.len();
    let mut series = IndicatorSeries::absent(IndicatorType::Rsi(period), n);
    if n <= period {
        return Ok(series);
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut avg_gain = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[1..=period].iter().sum::<f64>() / period as f64;
    series.values[period] = Some(IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)));

    for i in (period + 1)..n {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        series.values[i] = Some(IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)));
    }

    Ok(series)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
