//! End-to-end pipeline tests against an in-memory data port.

mod common;

use barlab::domain::backtest::{
    compute_indicators, run_backtest, BacktestConfig, BollingerParams, IndicatorConfig,
    SignalIndicator,
};
use barlab::domain::error::BarlabError;
use barlab::domain::signal::Signal;
use common::*;

fn indicator_config(symbol: &str) -> IndicatorConfig {
    IndicatorConfig {
        symbol: symbol.to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        sma_period: Some(3),
        ema_period: Some(3),
        rsi_period: Some(3),
        bollinger: Some(BollingerParams {
            period: 3,
            num_std: 2.0,
        }),
    }
}

mod indicators_pipeline {
    use super::*;

    #[test]
    fn all_indicators_share_the_bar_timeline() {
        let closes = [10.0, 11.0, 12.0, 11.5, 13.0, 12.5, 14.0];
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&closes));

        let response = compute_indicators(&port, &indicator_config("aapl")).unwrap();

        assert_eq!(response.symbol, "AAPL");
        assert_eq!(response.points.len(), closes.len());
        for (i, point) in response.points.iter().enumerate() {
            assert_eq!(point.close, closes[i]);
            assert_eq!(point.sma.is_some(), i >= 2);
            assert_eq!(point.ema.is_some(), i >= 2);
            assert_eq!(point.rsi.is_some(), i >= 3);
            assert_eq!(point.bb_middle.is_some(), i >= 2);
        }
    }

    #[test]
    fn sma_and_ema_agree_at_first_defined_bar() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[1.1, 2.2, 3.3, 4.4]));
        let response = compute_indicators(&port, &indicator_config("AAPL")).unwrap();

        assert_eq!(response.points[2].sma, response.points[2].ema);
        assert_eq!(response.points[2].bb_middle, response.points[2].sma);
    }

    #[test]
    fn symbol_is_normalized_before_fetch() {
        let port = MockDataPort::new().with_bars("MSFT", make_bars(&[1.0, 2.0, 3.0]));
        compute_indicators(&port, &indicator_config("  msft ")).unwrap();

        let requests = port.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "MSFT");
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let port = MockDataPort::new();
        let err = compute_indicators(&port, &indicator_config("ZZZ")).unwrap_err();
        assert!(matches!(err, BarlabError::NotFound { symbol, .. } if symbol == "ZZZ"));
    }

    #[test]
    fn data_port_errors_propagate() {
        let port = MockDataPort::new().with_error("AAPL", "disk on fire");
        let err = compute_indicators(&port, &indicator_config("AAPL")).unwrap_err();
        assert!(matches!(err, BarlabError::Data { .. }));
    }

    #[test]
    fn invalid_period_never_reaches_data_port() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[1.0, 2.0]));
        let config = IndicatorConfig {
            sma_period: Some(0),
            ..indicator_config("AAPL")
        };

        let err = compute_indicators(&port, &config).unwrap_err();
        assert!(matches!(err, BarlabError::InvalidParameter { name, .. } if name == "sma_period"));
        assert!(port.requests.borrow().is_empty());
    }

    #[test]
    fn unsorted_bars_from_port_are_rejected() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars.swap(0, 2);
        let port = MockDataPort::new().with_bars("AAPL", bars);

        let err = compute_indicators(&port, &indicator_config("AAPL")).unwrap_err();
        assert!(matches!(err, BarlabError::InvalidInput { .. }));
    }

    #[test]
    fn series_shorter_than_period_is_all_absent() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[5.0, 6.0]));
        let response = compute_indicators(&port, &indicator_config("AAPL")).unwrap();

        assert!(response.points.iter().all(|p| p.sma.is_none()
            && p.ema.is_none()
            && p.rsi.is_none()
            && p.bb_upper.is_none()));
    }

    #[test]
    fn response_serializes_absent_values_as_null() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[5.0, 6.0, 7.0]));
        let response = compute_indicators(&port, &indicator_config("AAPL")).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["symbol"], "AAPL");
        assert!(json["points"][0]["sma"].is_null());
        assert_eq!(json["points"][2]["sma"], 6.0);
        assert_eq!(json["points"][0]["date"], "2024-01-01");
    }
}

mod backtest_pipeline {
    use super::*;

    fn config(signal: SignalIndicator, cash: f64) -> BacktestConfig {
        BacktestConfig {
            signal,
            initial_cash: cash,
            ..BacktestConfig::new("AAPL", date(2024, 1, 1), date(2024, 12, 31))
        }
    }

    #[test]
    fn rising_then_falling_series_makes_one_trade() {
        let closes = [10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 11.0, 9.0, 8.0];
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&closes));

        let result = run_backtest(&port, &config(SignalIndicator::Sma(3), 1000.0)).unwrap();

        // SMA(3) at day 4 is 10.67 < 12 so entry happens there; day 7 has 11 < 13.67
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_date, date(2024, 1, 4));
        assert_eq!(trade.exit_date, date(2024, 1, 7));
        assert!((trade.entry_price - 12.0).abs() < f64::EPSILON);
        assert!((trade.exit_price - 11.0).abs() < f64::EPSILON);

        let shares = 1000.0 / 12.0;
        assert!((trade.pnl - shares * (11.0 - 12.0)).abs() < 1e-9);
        assert_eq!(result.equity_curve.len(), closes.len());
        assert!((result.equity_curve[5].equity - shares * 16.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_match_equity_curve() {
        let closes = [10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 11.0, 9.0, 8.0];
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&closes));

        let result = run_backtest(&port, &config(SignalIndicator::Sma(3), 1000.0)).unwrap();
        let last = result.equity_curve.last().unwrap().equity;

        assert!((result.metrics.total_return_pct - (last / 1000.0 - 1.0) * 100.0).abs() < 1e-9);
        assert_eq!(result.metrics.num_trades, 1);
        assert!(result.metrics.win_rate_pct.abs() < f64::EPSILON);
        // peak at 16, trough at 11 while holding. flat afterwards
        let expected_dd = (16.0 - 11.0) / 16.0 * 100.0;
        assert!((result.metrics.max_drawdown_pct - expected_dd).abs() < 1e-9);
    }

    #[test]
    fn constant_prices_never_trade() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[50.0; 40]));
        let result = run_backtest(&port, &config(SignalIndicator::Sma(5), 2500.0)).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 40);
        assert!(result
            .equity_curve
            .iter()
            .all(|p| (p.equity - 2500.0).abs() < f64::EPSILON));
        assert!(result.metrics.sharpe_ratio.abs() < f64::EPSILON);
        assert!(result.metrics.total_return_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn open_position_at_end_is_not_a_trade() {
        let closes = [10.0, 10.0, 11.0, 12.0, 13.0];
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&closes));
        let result = run_backtest(&port, &config(SignalIndicator::Sma(2), 1000.0)).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.metrics.num_trades, 0);
        let last = result.equity_curve.last().unwrap().equity;
        assert!((last - 1000.0 / 11.0 * 13.0).abs() < 1e-9);
    }

    #[test]
    fn empty_range_is_not_found() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[1.0, 2.0, 3.0]));
        let cfg = BacktestConfig::new("AAPL", date(2023, 1, 1), date(2023, 6, 30));
        assert!(matches!(
            run_backtest(&port, &cfg),
            Err(BarlabError::NotFound { .. })
        ));
    }

    #[test]
    fn signal_period_over_limit_is_rejected() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&[1.0, 2.0]));
        let err = run_backtest(&port, &config(SignalIndicator::Sma(501), 1000.0)).unwrap_err();
        assert!(matches!(err, BarlabError::InvalidParameter { .. }));
        assert!(port.requests.borrow().is_empty());
    }

    #[test]
    fn result_serializes_trades_and_metrics() {
        let closes = [10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 11.0, 9.0, 8.0];
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&closes));
        let result = run_backtest(&port, &config(SignalIndicator::Sma(3), 1000.0)).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["trades"][0]["entry_date"], "2024-01-04");
        assert_eq!(json["trades"][0]["reason"], "close <= sma");
        assert_eq!(json["metrics"]["num_trades"], 1);
        assert_eq!(json["equity_curve"].as_array().unwrap().len(), closes.len());
    }
}

mod signal_semantics {
    use super::*;
    use barlab::domain::indicator::sma::calculate_sma;
    use barlab::domain::price_bar::{closes, dates};
    use barlab::domain::signal::generate_threshold_signals;

    #[test]
    fn signals_alternate_over_choppy_series() {
        let bars = make_bars(&[10.0, 12.0, 9.0, 13.0, 8.0, 14.0, 7.0, 15.0]);
        let closes = closes(&bars);
        let sma = calculate_sma(&closes, 2).unwrap();

        let signals =
            generate_threshold_signals(&dates(&bars), &closes, &sma.primary(), "sma").unwrap();

        assert!(!signals.is_empty());
        assert_eq!(signals[0].signal, Signal::EnterLong);
        for pair in signals.windows(2) {
            assert_ne!(pair[0].signal, pair[1].signal);
            assert!(pair[0].date < pair[1].date);
        }
    }
}
