//! Simple Moving Average.
//!
//! Running window sum: add the newest close, drop the one that left the window.
//! Warmup: first (n-1) bars are `None`.

use crate::domain::error::BarlabError;
use crate::domain::indicator::{require_period, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_sma(closes: &[f64], period: usize) -> Result<IndicatorSeries, BarlabError> {
    require_period("sma_period", period)?;

    let mut values = Vec::with_capacity(closes.len());
    let mut window_sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }

        if i + 1 >= period {
            values.push(Some(IndicatorValue::Simple(window_sum / period as f64)));
        } else {
            values.push(None);
        }
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}
