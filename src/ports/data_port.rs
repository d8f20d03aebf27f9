//! Price-bar supply port.

use crate::domain::error::BarlabError;
use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;

/// Source of historical daily bars for one symbol.
///
/// Implementations return bars in `[start, end]`, ascending by date and
/// without duplicate dates. An unknown symbol yields an empty vector.
pub trait DataPort {
    fn get_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BarlabError>;
}
