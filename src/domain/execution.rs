//! Long-only, all-in/all-out execution simulation.
//!
//! Fills happen at the signal bar's close. Entry converts all cash into
//! shares, exit converts all shares back into cash and records a [`Trade`].
//! A position still open after the last bar stays open and is only marked
//! to market.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::BarlabError;
use super::portfolio::Portfolio;
use super::position::{Position, Trade};
use super::price_bar::{validate_bars, PriceBar};
use super::signal::{Signal, SignalEvent};

/// Invest all cash at `price` and return the opened position.
///
/// Returns `None` while a position is already open.
pub fn enter_long(
    portfolio: &mut Portfolio,
    price: f64,
    date: NaiveDate,
    reason: Option<String>,
) -> Option<&Position> {
    if portfolio.is_holding() {
        return None;
    }

    let shares = portfolio.cash / price;
    portfolio.cash = 0.0;
    portfolio.position = Some(Position {
        shares,
        entry_price: price,
        entry_date: date,
        entry_reason: reason,
    });

    portfolio.position.as_ref()
}

/// Liquidate the open position at `price` and record the trade.
///
/// Returns `None` when flat.
pub fn exit_position(
    portfolio: &mut Portfolio,
    price: f64,
    date: NaiveDate,
    reason: Option<String>,
) -> Option<&Trade> {
    let position = portfolio.position.take()?;

    portfolio.cash = position.market_value(price);
    portfolio.record_trade(Trade::close(position, date, price, reason));

    portfolio.closed_trades.last()
}

/// Index signals by date. A later signal on the same date replaces an earlier one.
pub fn signal_map(signals: &[SignalEvent]) -> HashMap<NaiveDate, &SignalEvent> {
    let mut map = HashMap::with_capacity(signals.len());
    for signal in signals {
        map.insert(signal.date, signal);
    }
    map
}

/// Run the all-in/all-out strategy over `bars`, recording equity on every bar.
///
/// Signals dated on days with no bar are ignored.
pub fn run_long_only(
    bars: &[PriceBar],
    signals: &[SignalEvent],
    initial_cash: f64,
) -> Result<Portfolio, BarlabError> {
    if !(initial_cash > 0.0 && initial_cash.is_finite()) {
        return Err(BarlabError::invalid_parameter(
            "initial_cash",
            format!("initial_cash must be > 0 (got {})", initial_cash),
        ));
    }
    validate_bars(bars)?;

    let by_date = signal_map(signals);
    let mut portfolio = Portfolio::new(initial_cash);

    for bar in bars {
        if let Some(event) = by_date.get(&bar.date) {
            match event.signal {
                Signal::EnterLong => {
                    enter_long(&mut portfolio, bar.close, bar.date, event.reason.clone());
                }
                Signal::ExitLong => {
                    exit_position(&mut portfolio, bar.close, bar.date, event.reason.clone());
                }
            }
        }

        let equity = portfolio.total_equity(bar.close);
        portfolio.record_equity(bar.date, equity);
    }

    Ok(portfolio)
}
