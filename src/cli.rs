//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    self, BacktestConfig, BacktestResult, BollingerParams, IndicatorConfig, IndicatorsResponse,
    SignalIndicator, DEFAULT_INITIAL_CASH, DEFAULT_SIGNAL_PERIOD,
};
use crate::domain::config_validation::{
    non_empty, parse_date, parse_optional, validate_backtest_config, validate_indicator_config,
};
use crate::domain::error::BarlabError;
use crate::domain::indicator::bollinger::DEFAULT_NUM_STD;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "barlab", about = "Price-bar indicators and long-only backtests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators for a symbol and print them as JSON
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a long-only backtest and print the result as JSON
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a configuration file without loading any data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            config,
            symbol,
            output,
        } => run_indicators(&config, symbol.as_deref(), output.as_deref()),
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BarlabError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| match e {
        BarlabError::Io(io) => BarlabError::ConfigParse {
            file: path.display().to_string(),
            reason: io.to_string(),
        },
        other => other,
    })
}

fn run_indicators(
    config_path: &Path,
    symbol_override: Option<&str>,
    output: Option<&Path>,
) -> Result<(), BarlabError> {
    let adapter = load_config(config_path)?;
    validate_indicator_config(&adapter)?;

    let request = build_indicator_config(&adapter, symbol_override)?;
    let data_port = data_adapter(&adapter)?;

    info!(
        symbol = %request.symbol,
        start = %request.start_date,
        end = %request.end_date,
        "computing indicators"
    );
    let response = backtest::compute_indicators(&data_port, &request)?;

    print_indicator_summary(&response);
    write_json(&response, output)
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output: Option<&Path>,
) -> Result<(), BarlabError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;

    let request = build_backtest_config(&adapter, symbol_override)?;
    let data_port = data_adapter(&adapter)?;

    info!(
        symbol = %request.symbol,
        start = %request.start_date,
        end = %request.end_date,
        signal = ?request.signal,
        "running backtest"
    );
    let result = backtest::run_backtest(&data_port, &request)?;

    print_backtest_summary(&request, &result);
    write_json(&result, output)
}

fn run_validate(config_path: &Path) -> Result<(), BarlabError> {
    let adapter = load_config(config_path)?;

    if adapter.has_section("indicators") {
        validate_indicator_config(&adapter)?;
        build_indicator_config(&adapter, None)?.validate()?;
        eprintln!("[indicators] ok");
    }
    validate_backtest_config(&adapter)?;
    build_backtest_config(&adapter, None)?.validate()?;
    eprintln!("[backtest] ok");

    eprintln!("Configuration is valid: {}", config_path.display());
    Ok(())
}

/// `--symbol` wins over `[request] symbol`.
pub fn resolve_symbol(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<String, BarlabError> {
    match symbol_override {
        Some(s) => Ok(s.to_string()),
        None => non_empty(adapter, "request", "symbol").ok_or_else(|| {
            BarlabError::ConfigMissing {
                section: "request".into(),
                key: "symbol".into(),
            }
        }),
    }
}

pub fn data_adapter(adapter: &dyn ConfigPort) -> Result<CsvAdapter, BarlabError> {
    let dir = non_empty(adapter, "data", "csv_dir").ok_or_else(|| BarlabError::ConfigMissing {
        section: "data".into(),
        key: "csv_dir".into(),
    })?;
    debug!(csv_dir = %dir, "using CSV data directory");
    Ok(CsvAdapter::new(PathBuf::from(dir)))
}

pub fn build_indicator_config(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<IndicatorConfig, BarlabError> {
    let bollinger = match parse_optional::<usize>(adapter, "indicators", "bb_period")? {
        Some(period) => Some(BollingerParams {
            period,
            num_std: parse_optional(adapter, "indicators", "bb_std")?.unwrap_or(DEFAULT_NUM_STD),
        }),
        None => None,
    };

    Ok(IndicatorConfig {
        symbol: resolve_symbol(symbol_override, adapter)?,
        start_date: parse_date(adapter, "request", "start_date")?,
        end_date: parse_date(adapter, "request", "end_date")?,
        sma_period: parse_optional(adapter, "indicators", "sma_period")?,
        ema_period: parse_optional(adapter, "indicators", "ema_period")?,
        rsi_period: parse_optional(adapter, "indicators", "rsi_period")?,
        bollinger,
    })
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<BacktestConfig, BarlabError> {
    if !adapter.has_section("backtest") {
        debug!("no [backtest] section, using defaults");
    }

    let period = parse_optional(adapter, "backtest", "signal_period")?
        .unwrap_or(DEFAULT_SIGNAL_PERIOD);
    let signal = match non_empty(adapter, "backtest", "signal_indicator")
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        None | Some("sma") => SignalIndicator::Sma(period),
        Some("ema") => SignalIndicator::Ema(period),
        Some(other) => {
            return Err(BarlabError::ConfigInvalid {
                section: "backtest".into(),
                key: "signal_indicator".into(),
                reason: format!("expected sma or ema, got {}", other),
            })
        }
    };

    Ok(BacktestConfig {
        symbol: resolve_symbol(symbol_override, adapter)?,
        start_date: parse_date(adapter, "request", "start_date")?,
        end_date: parse_date(adapter, "request", "end_date")?,
        signal,
        initial_cash: parse_optional(adapter, "backtest", "initial_cash")?
            .unwrap_or(DEFAULT_INITIAL_CASH),
        risk_free_rate: parse_optional(adapter, "backtest", "risk_free_rate")?.unwrap_or(0.0),
        periods_per_year: parse_optional(adapter, "backtest", "periods_per_year")?
            .unwrap_or(TRADING_DAYS_PER_YEAR),
    })
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), BarlabError> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            eprintln!("Output written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_indicator_summary(response: &IndicatorsResponse) {
    let (Some(first), Some(last)) = (response.points.first(), response.points.last()) else {
        return;
    };
    eprintln!("\n=== Indicators ===");
    eprintln!("Symbol:           {}", response.symbol);
    eprintln!("Bars:             {}", response.points.len());
    eprintln!("Range:            {} to {}", first.date, last.date);
}

fn print_backtest_summary(config: &BacktestConfig, result: &BacktestResult) {
    let final_equity = result
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_cash);
    let m = &result.metrics;

    eprintln!("\n=== Results ===");
    eprintln!("Initial Cash:     {:.2}", config.initial_cash);
    eprintln!("Final Equity:     {:.2}", final_equity);
    eprintln!("Total Return:     {:.2}%", m.total_return_pct);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown_pct);
    eprintln!("Total Trades:     {}", m.num_trades);
    eprintln!("Win Rate:         {:.1}%", m.win_rate_pct);
}
