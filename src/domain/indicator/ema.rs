//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are `None`; a series shorter than n is all `None`.

use crate::domain::error::BarlabError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(closes: &[f64], period: usize) -> Result<IndicatorSeries, BarlabError> {
    require_period("ema_period", period)?;

    if closes.len() < period {
        return Ok(IndicatorSeries::absent(IndicatorType::Ema(period), closes.len()));
    }

    let mut values = Vec::with_capacity(closes.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        if i < period - 1 {
            sum += close;
            values.push(None);
        } else if i == period - 1 {
            // Same left-to-right accumulation as the SMA window, so the two agree exactly here.
            sum += close;
            ema = sum / period as f64;
            values.push(Some(IndicatorValue::Simple(ema)));
        } else {
            ema = close * k + ema * (1.0 - k);
            values.push(Some(IndicatorValue::Simple(ema)));
        }
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    })
}
