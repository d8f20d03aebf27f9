//! CSV file data adapter.
//!
//! One file per symbol, `<SYMBOL>.csv`, with a header row and the columns
//! `Date,Open,High,Low,Close,Volume`. Volume may be blank.

use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::BarlabError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_error(line: u64, reason: String) -> BarlabError {
    BarlabError::Data {
        reason: format!("line {}: {}", line, reason),
    }
}

fn parse_price(
    record: &StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<f64, BarlabError> {
    let raw = record
        .get(index)
        .ok_or_else(|| data_error(line, format!("missing {} column", name)))?;
    raw.parse()
        .map_err(|e| data_error(line, format!("invalid {} value {:?}: {}", name, raw, e)))
}

fn parse_volume(record: &StringRecord, line: u64) -> Result<Option<i64>, BarlabError> {
    match record.get(5) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .or_else(|_| raw.parse::<f64>().map(|v| v as i64))
            .map(Some)
            .map_err(|e| data_error(line, format!("invalid volume value {:?}: {}", raw, e))),
    }
}

fn parse_record(record: &StringRecord) -> Result<PriceBar, BarlabError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let date_str = record
        .get(0)
        .ok_or_else(|| data_error(line, "missing date column".into()))?;
    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|e| data_error(line, format!("invalid date {:?}: {}", date_str, e)))?;

    Ok(PriceBar {
        date,
        open: parse_price(record, 1, "open", line)?,
        high: parse_price(record, 2, "high", line)?,
        low: parse_price(record, 3, "low", line)?,
        close: parse_price(record, 4, "close", line)?,
        volume: parse_volume(record, line)?,
    })
}

impl DataPort for CsvAdapter {
    fn get_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, BarlabError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no data file for symbol");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(BarlabError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BarlabError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let bar = parse_record(&record)?;
            if bar.date < start || bar.date > end {
                continue;
            }
            bars.push(bar);
        }

        // stable sort, so the first row for a date is the one kept
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() != before {
            warn!(
                symbol,
                dropped = before - bars.len(),
                "duplicate dates in data file, keeping first row"
            );
        }

        debug!(symbol, bars = bars.len(), %start, %end, "loaded bars");
        Ok(bars)
    }
}
