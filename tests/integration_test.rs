//! End-to-end tests over the search pipeline.
//!
//! Tests cover:
//! - The three-bar take-profit scenario through the public API
//! - Full search from a CSV file on disk to a JSON-lines report
//! - Determinism and parallel/sequential parity of the search
//! - Per-file error isolation with a mock data port

mod common;

use approx::assert_relative_eq;
use common::*;
use stratsearch::adapters::csv_adapter::CsvAdapter;
use stratsearch::adapters::gaussian_oracle::GaussianConfig;
use stratsearch::adapters::json_report_adapter::JsonReportAdapter;
use stratsearch::adapters::oracle_factory::{OracleKind, SeededOracleFactory};
use stratsearch::cli::search_files;
use stratsearch::domain::backtest::{BacktestConfig, run_backtest};
use stratsearch::domain::error::StratsearchError;
use stratsearch::domain::indicator::IndicatorName;
use stratsearch::domain::ohlcv::PriceSeries;
use stratsearch::domain::optimizer::{OptimizerConfig, ParameterOptimizer};
use stratsearch::domain::params::{ParamValue, TradeParams};
use stratsearch::domain::search::{SearchResult, StrategySearch};
use stratsearch::domain::signal::{self, SignalColumn, SignalMatrix};
use stratsearch::domain::strategy::powerset;
use stratsearch::ports::data_port::PriceDataPort;
use stratsearch::ports::report_port::ReportPort;

fn search(kind: OracleKind, seed: u64, trials: usize, parallel: bool) -> StrategySearch {
    StrategySearch::new(
        ParameterOptimizer::new(OptimizerConfig {
            trials,
            ..OptimizerConfig::default()
        }),
        Box::new(SeededOracleFactory::new(kind, seed)),
    )
    .with_parallel(parallel)
}

fn gaussian() -> OracleKind {
    OracleKind::Gaussian(GaussianConfig {
        startup_trials: 3,
        ..GaussianConfig::default()
    })
}

mod simulator_scenarios {
    use super::*;

    #[test]
    fn three_bar_take_profit() {
        let series = PriceSeries::from_closes("scenario", &[100.0, 105.0, 95.0]).unwrap();
        let mut matrix = SignalMatrix::new(3);
        matrix
            .insert(
                IndicatorName::Roc,
                SignalColumn {
                    buy: vec![true, false, false],
                    sell: vec![false, false, false],
                },
            )
            .unwrap();
        let trade = TradeParams {
            n_shares: 10,
            stop_loss: 0.05,
            take_profit: 0.05,
        };

        let result = run_backtest(&series, &matrix, &trade, &BacktestConfig::default()).unwrap();
        assert_relative_eq!(result.final_cash, 1_000_024.375, max_relative = 1e-12);
        assert_eq!(result.portfolio.position_count(), 0);
    }

    #[test]
    fn generated_signals_drive_simulation() {
        let series = wave_series(300);
        let strategy = "rsi".parse().unwrap();
        let params = trade_vector(20, 0.02, 0.03)
            .with("rsi_window", ParamValue::Int(10))
            .with("rsi_upper", ParamValue::Float(65.0))
            .with("rsi_lower", ParamValue::Float(35.0));

        let matrix = signal::generate(&series, &strategy, &params).unwrap();
        let trade = TradeParams::from_vector(&params).unwrap();
        let result = run_backtest(&series, &matrix, &trade, &BacktestConfig::default()).unwrap();

        assert!(!result.portfolio.closed_trades.is_empty());
        assert!(result.final_cash > 0.0);
        assert_ne!(result.final_cash, 1_000_000.0);
    }
}

mod full_search {
    use super::*;

    fn assert_valid(result: &SearchResult) {
        assert_eq!(result.summaries.len(), 15);
        assert!(result.params.validate(&result.strategy).is_ok());
        assert!(result.value > 0.0);
        for pair in result.best_history.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn search_from_csv_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_csv(dir.path(), "prices.csv", &wave_closes(260));

        let series = CsvAdapter::new()
            .load_series(&path.to_string_lossy())
            .unwrap();
        assert_eq!(series.len(), 260);

        let result = search(gaussian(), 42, 6, true).search(&series).unwrap();
        assert_valid(&result);
        let order: Vec<_> = result.summaries.iter().map(|s| s.strategy).collect();
        assert_eq!(order, powerset());
    }

    #[test]
    fn same_seed_same_result() {
        let series = wave_series(240);
        let a = search(gaussian(), 7, 6, true).search(&series).unwrap();
        let b = search(gaussian(), 7, 6, true).search(&series).unwrap();
        assert_eq!(a.strategy, b.strategy);
        assert_eq!(a.params, b.params);
        assert_eq!(a.value, b.value);
    }

    #[test]
    fn parallel_matches_sequential_with_random_oracle() {
        let series = wave_series(240);
        let par = search(OracleKind::Random, 3, 5, true).search(&series).unwrap();
        let seq = search(OracleKind::Random, 3, 5, false).search(&series).unwrap();
        assert_valid(&par);
        assert_eq!(par.strategy, seq.strategy);
        assert_eq!(par.params, seq.params);
        assert_eq!(par.value, seq.value);
        assert_eq!(par.best_history, seq.best_history);
    }

    #[test]
    fn short_series_fails_some_trials_but_completes() {
        // long enough for small windows, too short for the largest ones
        let series = wave_series(60);
        let result = search(OracleKind::Random, 11, 12, true)
            .search(&series)
            .unwrap();
        let failed: usize = result.summaries.iter().map(|s| s.failed).sum();
        assert!(failed > 0);
        assert_valid(&result);
    }
}

mod file_pipeline {
    use super::*;

    #[test]
    fn failing_file_is_reported_alongside_successes() {
        let port = MockDataPort::new()
            .with_closes("a", &wave_closes(220))
            .with_error("b", "disk on fire")
            .with_closes("c", &wave_closes(220));
        let files = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let reports = search_files(&port, &search(gaussian(), 1, 4, true), &files, true);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].outcome.is_ok());
        assert!(matches!(reports[1].outcome, Err(StratsearchError::Data { .. })));
        assert!(reports[2].outcome.is_ok());
    }

    #[test]
    fn reports_written_as_json_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = write_csv(dir.path(), "good.csv", &wave_closes(220));
        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "Close\n").unwrap();
        let files = vec![
            good.to_string_lossy().to_string(),
            empty.to_string_lossy().to_string(),
        ];

        let reports = search_files(&CsvAdapter::new(), &search(gaussian(), 5, 4, false), &files, false);
        let out = dir.path().join("out.jsonl");
        JsonReportAdapter::new(Some(out.clone()))
            .write(&reports)
            .unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["file"], files[0].as_str());
        let strategy = lines[0]["strategy"].as_array().unwrap();
        assert!(!strategy.is_empty());
        assert!(lines[0]["value"].as_f64().unwrap() > 0.0);
        assert!(lines[0]["params"]["n_shares"].is_i64());
        assert!(lines[0]["params"]["stop_loss"].is_f64());

        assert_eq!(lines[1]["file"], files[1].as_str());
        assert!(lines[1]["error"].is_string());
    }
}
