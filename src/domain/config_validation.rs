//! Configuration validation.
//!
//! Checks that every key is present where required and parses to the right
//! type before a request is built. Range checks (period bounds, positive
//! cash, ...) are left to the request types in [`crate::domain::backtest`].

use crate::domain::error::BarlabError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `[data]`, `[request]` and `[indicators]` sections.
pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), BarlabError> {
    validate_data_section(config)?;
    validate_request_section(config)?;
    for key in ["sma_period", "ema_period", "rsi_period", "bb_period"] {
        parse_optional::<usize>(config, "indicators", key)?;
    }
    parse_optional::<f64>(config, "indicators", "bb_std")?;
    Ok(())
}

/// `[data]`, `[request]` and `[backtest]` sections.
pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BarlabError> {
    validate_data_section(config)?;
    validate_request_section(config)?;
    validate_signal_indicator(config)?;
    parse_optional::<usize>(config, "backtest", "signal_period")?;
    for key in ["initial_cash", "risk_free_rate", "periods_per_year"] {
        parse_optional::<f64>(config, "backtest", key)?;
    }
    Ok(())
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), BarlabError> {
    match non_empty(config, "data", "csv_dir") {
        Some(_) => Ok(()),
        None => Err(BarlabError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        }),
    }
}

fn validate_request_section(config: &dyn ConfigPort) -> Result<(), BarlabError> {
    let start = parse_date(config, "request", "start_date")?;
    let end = parse_date(config, "request", "end_date")?;

    if start > end {
        return Err(BarlabError::ConfigInvalid {
            section: "request".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_signal_indicator(config: &dyn ConfigPort) -> Result<(), BarlabError> {
    match non_empty(config, "backtest", "signal_indicator") {
        None => Ok(()),
        Some(name) if matches!(name.to_lowercase().as_str(), "sma" | "ema") => Ok(()),
        Some(name) => Err(BarlabError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "signal_indicator".to_string(),
            reason: format!("expected sma or ema, got {}", name),
        }),
    }
}

/// Trimmed value, treating a blank value the same as a missing key.
pub fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a key if present; a value that does not parse is `ConfigInvalid`.
pub fn parse_optional<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, BarlabError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| BarlabError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse {:?}: {}", raw, e),
            }),
    }
}

pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, BarlabError> {
    match non_empty(config, section, key) {
        None => Err(BarlabError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| BarlabError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            })
        }
    }
}
