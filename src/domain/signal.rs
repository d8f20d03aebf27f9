//! Threshold-crossing signal generation.
//!
//! Two-state machine (flat / long), starting flat. On every bar with a defined
//! indicator value the desired state is long when `close > indicator`, flat
//! otherwise; an event is emitted only when the desired state differs from the
//! current one. Warm-up bars are skipped without touching the state, so the
//! emitted signals strictly alternate enter, exit, enter, ...

use chrono::NaiveDate;
use serde::Serialize;

use super::error::BarlabError;
use super::price_bar::ensure_ascending;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i8")]
pub enum Signal {
    EnterLong,
    ExitLong,
}

impl Signal {
    /// +1 for enter-long, -1 for exit-long.
    pub fn value(self) -> i8 {
        match self {
            Signal::EnterLong => 1,
            Signal::ExitLong => -1,
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    pub date: NaiveDate,
    pub signal: Signal,
    pub reason: Option<String>,
}

impl SignalEvent {
    pub fn enter(date: NaiveDate, reason: impl Into<String>) -> Self {
        SignalEvent {
            date,
            signal: Signal::EnterLong,
            reason: Some(reason.into()),
        }
    }

    pub fn exit(date: NaiveDate, reason: impl Into<String>) -> Self {
        SignalEvent {
            date,
            signal: Signal::ExitLong,
            reason: Some(reason.into()),
        }
    }
}

/// Emit state-change signals for `close` against `indicator`.
///
/// `label` names the indicator in the reasons (`"close > sma"`, `"close <= sma"`).
pub fn generate_threshold_signals(
    dates: &[NaiveDate],
    closes: &[f64],
    indicator: &[Option<f64>],
    label: &str,
) -> Result<Vec<SignalEvent>, BarlabError> {
    let n = dates.len();
    if closes.len() != n || indicator.len() != n {
        return Err(BarlabError::invalid_input(format!(
            "dates, closes and indicator must be the same length (got {}, {}, {})",
            n,
            closes.len(),
            indicator.len()
        )));
    }
    ensure_ascending(dates)?;

    let mut signals = Vec::new();
    let mut long = false;

    for i in 0..n {
        let Some(level) = indicator[i] else {
            continue;
        };

        let want_long = closes[i] > level;
        if want_long == long {
            continue;
        }

        if want_long {
            signals.push(SignalEvent::enter(dates[i], format!("close > {}", label)));
        } else {
            signals.push(SignalEvent::exit(dates[i], format!("close <= {}", label)));
        }
        long = want_long;
    }

    Ok(signals)
}
