//! Pipeline orchestration: validate, fetch bars, compute, compose.
//!
//! Two entry points share the same front half ([`load_bars`]):
//! - [`compute_indicators`] returns the requested indicators per bar.
//! - [`run_backtest`] runs indicator → signals → execution → metrics.
//!
//! Every parameter is checked before the data port is touched, and nothing is
//! returned unless every stage succeeded.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BarlabError;
use super::execution::run_long_only;
use super::indicator::bollinger::calculate_bollinger;
use super::indicator::ema::calculate_ema;
use super::indicator::rsi::calculate_rsi;
use super::indicator::sma::calculate_sma;
use super::indicator::{IndicatorSeries, IndicatorValue};
use super::metrics::{Metrics, MetricsConfig, TRADING_DAYS_PER_YEAR};
use super::portfolio::EquityPoint;
use super::position::Trade;
use super::price_bar::{closes, dates, validate_bars, PriceBar};
use super::signal::generate_threshold_signals;
use crate::ports::data_port::DataPort;

pub const MIN_PERIOD: usize = 1;
pub const MAX_PERIOD: usize = 500;
pub const MIN_BB_STD: f64 = 0.1;
pub const MAX_BB_STD: f64 = 5.0;
pub const DEFAULT_SIGNAL_PERIOD: usize = 20;
pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerParams {
    pub period: usize,
    pub num_std: f64,
}

/// Which indicator the close is compared against to decide the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalIndicator {
    Sma(usize),
    Ema(usize),
}

impl SignalIndicator {
    pub fn period(&self) -> usize {
        match *self {
            SignalIndicator::Sma(p) | SignalIndicator::Ema(p) => p,
        }
    }

    fn calculate(&self, closes: &[f64]) -> Result<IndicatorSeries, BarlabError> {
        match *self {
            SignalIndicator::Sma(p) => calculate_sma(closes, p),
            SignalIndicator::Ema(p) => calculate_ema(closes, p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sma_period: Option<usize>,
    pub ema_period: Option<usize>,
    pub rsi_period: Option<usize>,
    pub bollinger: Option<BollingerParams>,
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), BarlabError> {
        normalize_symbol(&self.symbol)?;
        validate_date_range(self.start_date, self.end_date)?;
        validate_optional_period("sma_period", self.sma_period)?;
        validate_optional_period("ema_period", self.ema_period)?;
        validate_optional_period("rsi_period", self.rsi_period)?;
        if let Some(bb) = &self.bollinger {
            validate_period("bb_period", bb.period)?;
            if !(MIN_BB_STD..=MAX_BB_STD).contains(&bb.num_std) {
                return Err(BarlabError::invalid_parameter(
                    "bb_std",
                    format!(
                        "must be between {} and {} (got {})",
                        MIN_BB_STD, MAX_BB_STD, bb.num_std
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub signal: SignalIndicator,
    pub initial_cash: f64,
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl BacktestConfig {
    /// SMA(20) threshold strategy with 10,000 cash and daily annualization.
    pub fn new(symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            symbol: symbol.to_string(),
            start_date,
            end_date,
            signal: SignalIndicator::Sma(DEFAULT_SIGNAL_PERIOD),
            initial_cash: DEFAULT_INITIAL_CASH,
            risk_free_rate: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    pub fn validate(&self) -> Result<(), BarlabError> {
        normalize_symbol(&self.symbol)?;
        validate_date_range(self.start_date, self.end_date)?;
        validate_period("signal_period", self.signal.period())?;
        if !(self.initial_cash > 0.0 && self.initial_cash.is_finite()) {
            return Err(BarlabError::invalid_parameter(
                "initial_cash",
                format!("must be > 0 (got {})", self.initial_cash),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(BarlabError::invalid_parameter(
                "risk_free_rate",
                "must be a finite number",
            ));
        }
        if !(self.periods_per_year > 0.0 && self.periods_per_year.is_finite()) {
            return Err(BarlabError::invalid_parameter(
                "periods_per_year",
                format!("must be > 0 (got {})", self.periods_per_year),
            ));
        }
        Ok(())
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            risk_free_rate: self.risk_free_rate,
            periods_per_year: self.periods_per_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorsResponse {
    pub symbol: String,
    pub points: Vec<IndicatorPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
}

/// Trimmed, upper-cased ticker. Empty symbols are rejected.
pub fn normalize_symbol(symbol: &str) -> Result<String, BarlabError> {
    let ticker = symbol.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(BarlabError::invalid_parameter("symbol", "must not be empty"));
    }
    Ok(ticker)
}

fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), BarlabError> {
    if start > end {
        return Err(BarlabError::invalid_parameter(
            "start_date",
            format!("start {} must be <= end {}", start, end),
        ));
    }
    Ok(())
}

fn validate_period(name: &str, period: usize) -> Result<(), BarlabError> {
    if !(MIN_PERIOD..=MAX_PERIOD).contains(&period) {
        return Err(BarlabError::invalid_parameter(
            name,
            format!(
                "period must be between {} and {} (got {})",
                MIN_PERIOD, MAX_PERIOD, period
            ),
        ));
    }
    Ok(())
}

fn validate_optional_period(name: &str, period: Option<usize>) -> Result<(), BarlabError> {
    match period {
        Some(p) => validate_period(name, p),
        None => Ok(()),
    }
}

/// Fetch and check the bars for `symbol`; an empty result is `NotFound`.
pub fn load_bars(
    data_port: &dyn DataPort,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, BarlabError> {
    let bars = data_port.get_bars(symbol, start, end)?;
    if bars.is_empty() {
        return Err(BarlabError::NotFound {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }
    validate_bars(&bars)?;
    Ok(bars)
}

fn optional_series(
    period: Option<usize>,
    closes: &[f64],
    calculate: fn(&[f64], usize) -> Result<IndicatorSeries, BarlabError>,
) -> Result<Vec<Option<f64>>, BarlabError> {
    match period {
        Some(p) => Ok(calculate(closes, p)?.primary()),
        None => Ok(vec![None; closes.len()]),
    }
}

pub fn compute_indicators(
    data_port: &dyn DataPort,
    config: &IndicatorConfig,
) -> Result<IndicatorsResponse, BarlabError> {
    config.validate()?;
    let symbol = normalize_symbol(&config.symbol)?;

    let bars = load_bars(data_port, &symbol, config.start_date, config.end_date)?;
    let points = indicator_points(&bars, config)?;

    Ok(IndicatorsResponse { symbol, points })
}

/// Per-bar indicator rows for already-loaded `bars`.
pub fn indicator_points(
    bars: &[PriceBar],
    config: &IndicatorConfig,
) -> Result<Vec<IndicatorPoint>, BarlabError> {
    validate_bars(bars)?;
    let closes = closes(bars);

    let sma = optional_series(config.sma_period, &closes, calculate_sma)?;
    let ema = optional_series(config.ema_period, &closes, calculate_ema)?;
    let rsi = optional_series(config.rsi_period, &closes, calculate_rsi)?;
    let bands = match &config.bollinger {
        Some(bb) => calculate_bollinger(&closes, bb.period, bb.num_std)?.values,
        None => vec![None; closes.len()],
    };

    let points = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (bb_upper, bb_middle, bb_lower) = match bands[i] {
                Some(IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                }) => (Some(upper), Some(middle), Some(lower)),
                _ => (None, None, None),
            };
            IndicatorPoint {
                date: bar.date,
                close: bar.close,
                sma: sma[i],
                ema: ema[i],
                rsi: rsi[i],
                bb_middle,
                bb_upper,
                bb_lower,
            }
        })
        .collect();

    Ok(points)
}

pub fn run_backtest(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
) -> Result<BacktestResult, BarlabError> {
    config.validate()?;
    let symbol = normalize_symbol(&config.symbol)?;

    let bars = load_bars(data_port, &symbol, config.start_date, config.end_date)?;
    backtest_bars(&bars, config)
}

/// Indicator → signals → execution → metrics over already-loaded `bars`.
pub fn backtest_bars(
    bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, BarlabError> {
    validate_bars(bars)?;
    let closes = closes(bars);

    let indicator = config.signal.calculate(&closes)?;
    let signals = generate_threshold_signals(
        &dates(bars),
        &closes,
        &indicator.primary(),
        indicator.indicator_type.short_name(),
    )?;

    let portfolio = run_long_only(bars, &signals, config.initial_cash)?;
    let metrics = Metrics::compute(
        &portfolio.equity_curve,
        &portfolio.closed_trades,
        &config.metrics_config(),
    );

    Ok(BacktestResult {
        equity_curve: portfolio.equity_curve,
        trades: portfolio.closed_trades,
        metrics,
    })
}
