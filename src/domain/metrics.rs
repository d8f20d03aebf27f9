//! Performance metrics and statistics.

use serde::Serialize;

use super::portfolio::EquityPoint;
use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Risk-free rate and annualization for the Sharpe ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsConfig {
    /// Annual rate, e.g. 0.05 for 5%.
    pub risk_free_rate: f64,
    /// Bars per year; 252 for daily bars.
    pub periods_per_year: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            risk_free_rate: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub num_trades: usize,
    pub sharpe_ratio: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[Trade], config: &MetricsConfig) -> Self {
        Metrics {
            total_return_pct: total_return_pct(equity_curve),
            max_drawdown_pct: max_drawdown_pct(equity_curve),
            win_rate_pct: win_rate_pct(trades),
            num_trades: trades.len(),
            sharpe_ratio: sharpe_ratio(equity_curve, config),
        }
    }
}

fn total_return_pct(equity_curve: &[EquityPoint]) -> f64 {
    let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) else {
        return 0.0;
    };
    if first.equity <= 0.0 {
        return 0.0;
    }
    (last.equity / first.equity - 1.0) * 100.0
}

fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd * 100.0
}

fn win_rate_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    wins as f64 / trades.len() as f64 * 100.0
}

fn sharpe_ratio(equity_curve: &[EquityPoint], config: &MetricsConfig) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 || !stddev.is_finite() {
        return 0.0;
    }

    let period_rf = config.risk_free_rate / config.periods_per_year;
    (mean - period_rf) / stddev * config.periods_per_year.sqrt()
}
