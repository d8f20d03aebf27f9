//! Open position and closed trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// A fully invested long holding.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_reason: Option<String>,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }
}

/// A round trip, built once when the position closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub reason: Option<String>,
}

impl Trade {
    /// Close `position` at `exit_price`.
    ///
    /// The exit reason wins; the entry reason is used when the exit has none.
    pub fn close(
        position: Position,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: Option<String>,
    ) -> Self {
        let proceeds = position.market_value(exit_price);
        Trade {
            entry_date: position.entry_date,
            exit_date,
            entry_price: position.entry_price,
            exit_price,
            pnl: proceeds - position.cost_basis(),
            return_pct: exit_price / position.entry_price - 1.0,
            reason: exit_reason.or(position.entry_reason),
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
