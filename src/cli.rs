//! CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::gaussian_oracle::GaussianConfig;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::oracle_factory::{OracleKind, SeededOracleFactory};
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{SEARCH, evaluate_params, validate_search_config};
use crate::domain::error::StratsearchError;
use crate::domain::optimizer::{DEFAULT_TRIALS, OptimizerConfig, ParameterOptimizer};
use crate::domain::params::{TradeParams, specs_for};
use crate::domain::search::{FileReport, StrategySearch};
use crate::domain::signal;
use crate::domain::strategy::powerset;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_SEED: u64 = 42;

#[derive(Parser, Debug)]
#[command(
    name = "stratsearch",
    about = "Exhaustive indicator-strategy search over historical prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search every indicator subset for its best parameters, per file
    Search {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trials per strategy
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Run strategy subsets one after another
        #[arg(long)]
        sequential: bool,
        /// JSON-lines output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Backtest the strategy and parameters from the [evaluate] section
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        file: PathBuf,
    },
    /// List strategies in search order with their parameters
    Strategies,
    /// Validate a configuration file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Search {
            config,
            trials,
            seed,
            sequential,
            output,
            files,
        } => run_search(
            config.as_deref(),
            SearchOverrides {
                trials,
                seed,
                sequential,
                output,
            },
            &files,
        ),
        Command::Evaluate { config, file } => run_evaluate(&config, &file),
        Command::Strategies => run_strategies(),
        Command::CheckConfig { config } => run_check_config(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Fully resolved settings for a search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub optimizer: OptimizerConfig,
    pub oracle: OracleKind,
    pub seed: u64,
    pub parallel: bool,
    pub output: Option<PathBuf>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub sequential: bool,
    pub output: Option<PathBuf>,
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_cash: adapter.get_double(SEARCH, "initial_cash", defaults.initial_cash),
        commission_rate: adapter.get_double(SEARCH, "commission_rate", defaults.commission_rate),
    }
}

/// Settings from a validated config, with defaults for absent keys.
pub fn build_search_settings(adapter: &dyn ConfigPort) -> Result<SearchSettings, StratsearchError> {
    validate_search_config(adapter)?;

    let trials = adapter.get_int(SEARCH, "trials", DEFAULT_TRIALS as i64);
    let seed = match adapter.get_string(SEARCH, "seed") {
        Some(raw) => raw.trim().parse().map_err(|_| StratsearchError::ConfigInvalid {
            section: SEARCH.into(),
            key: "seed".into(),
            reason: format!("cannot parse '{}'", raw.trim()),
        })?,
        None => DEFAULT_SEED,
    };

    let oracle = match adapter.get_string(SEARCH, "oracle") {
        Some(name) => name.parse()?,
        None => OracleKind::Gaussian(GaussianConfig::default()),
    };
    let oracle = match oracle {
        OracleKind::Gaussian(defaults) => OracleKind::Gaussian(GaussianConfig {
            startup_trials: adapter.get_int(SEARCH, "startup_trials", defaults.startup_trials as i64)
                as usize,
            explore_ratio: adapter.get_double(SEARCH, "explore_ratio", defaults.explore_ratio),
            top_k: adapter.get_int(SEARCH, "top_k", defaults.top_k as i64) as usize,
            sigma_ratio: adapter.get_double(SEARCH, "sigma_ratio", defaults.sigma_ratio),
        }),
        OracleKind::Random => OracleKind::Random,
    };

    Ok(SearchSettings {
        optimizer: OptimizerConfig {
            trials: trials as usize,
            backtest: build_backtest_config(adapter),
        },
        oracle,
        seed,
        parallel: adapter.get_bool(SEARCH, "parallel", true),
        output: adapter.get_string("output", "path").map(PathBuf::from),
    })
}

impl SearchSettings {
    pub fn apply(mut self, overrides: SearchOverrides) -> Result<Self, StratsearchError> {
        if let Some(trials) = overrides.trials {
            if trials == 0 {
                return Err(StratsearchError::ConfigInvalid {
                    section: SEARCH.into(),
                    key: "trials".into(),
                    reason: "trials must be at least 1".into(),
                });
            }
            self.optimizer.trials = trials;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if overrides.sequential {
            self.parallel = false;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        Ok(self)
    }

    pub fn strategy_search(&self) -> StrategySearch {
        StrategySearch::new(
            ParameterOptimizer::new(self.optimizer),
            Box::new(SeededOracleFactory::new(self.oracle, self.seed)),
        )
        .with_parallel(self.parallel)
    }
}

/// Load and search every file; a failing file only affects its own report.
pub fn search_files(
    data: &(dyn PriceDataPort + Sync),
    search: &StrategySearch,
    files: &[String],
    parallel: bool,
) -> Vec<FileReport> {
    let one = |file: &String| FileReport {
        file: file.clone(),
        outcome: data
            .load_series(file)
            .and_then(|series| search.search(&series)),
    };
    if parallel {
        files.par_iter().map(one).collect()
    } else {
        files.iter().map(one).collect()
    }
}

fn run_search(config_path: Option<&Path>, overrides: SearchOverrides, files: &[PathBuf]) -> ExitCode {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            }
        }
        None => FileConfigAdapter::empty(),
    };

    let settings = match build_search_settings(&adapter).and_then(|s| s.apply(overrides)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let strategies = powerset().len();
    eprintln!(
        "Searching {} file(s): {} strategies x {} trials, oracle {}, seed {}{}",
        files.len(),
        strategies,
        settings.optimizer.trials,
        settings.oracle,
        settings.seed,
        if settings.parallel { "" } else { " (sequential)" }
    );

    let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    let search = settings.strategy_search();
    let reports = search_files(&CsvAdapter::new(), &search, &names, settings.parallel);

    eprintln!("\n=== Results ===");
    let mut first_error: Option<ExitCode> = None;
    for report in &reports {
        match &report.outcome {
            Ok(result) => eprintln!(
                "{}: {} -> {:.2} ({} strategies evaluated)",
                report.file,
                result.strategy,
                result.value,
                result.summaries.len()
            ),
            Err(e) => {
                eprintln!("{}: error: {}", report.file, e);
                first_error.get_or_insert_with(|| e.into());
            }
        }
    }

    let reporter = JsonReportAdapter::new(settings.output.clone());
    if let Err(e) = reporter.write(&reports) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Some(path) = &settings.output {
        eprintln!("\nResults written to: {}", path.display());
    }

    first_error.unwrap_or(ExitCode::SUCCESS)
}

fn run_evaluate(config_path: &Path, file: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_search_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let (strategy, params) = match evaluate_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let config = build_backtest_config(&adapter);

    let source = file.display().to_string();
    let result = CsvAdapter::new().load_series(&source).and_then(|series| {
        eprintln!("Loaded {} bars from {}", series.len(), source);
        let matrix = signal::generate(&series, &strategy, &params)?;
        let trade = TradeParams::from_vector(&params)?;
        backtest_engine::run_backtest(&series, &matrix, &trade, &config)
    });
    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Strategy:        {}", strategy);
    eprintln!("Initial Cash:    {:.2}", config.initial_cash);
    eprintln!("Commission Rate: {}", config.commission_rate);
    eprintln!("Closed Trades:   {}", result.portfolio.closed_trades.len());
    eprintln!("Open Positions:  {}", result.portfolio.position_count());
    if result.gated_bars > 0 {
        eprintln!("Gated Bars:      {}", result.gated_bars);
    }

    println!(
        "{:>6} {:>6} {:>6} {:>12} {:>12} {:>12}  reason",
        "entry", "exit", "shares", "entry_px", "exit_px", "pnl"
    );
    for t in &result.portfolio.closed_trades {
        println!(
            "{:>6} {:>6} {:>6} {:>12.4} {:>12.4} {:>12.4}  {:?}",
            t.entry_index, t.exit_index, t.shares, t.entry_price, t.exit_price, t.pnl, t.reason
        );
    }
    println!("final_cash {}", result.final_cash);

    ExitCode::SUCCESS
}

fn run_strategies() -> ExitCode {
    for (i, strategy) in powerset().iter().enumerate() {
        let names: Vec<&str> = specs_for(strategy).iter().map(|s| s.name).collect();
        println!("{:>2}  {:<20} {}", i + 1, strategy.to_string(), names.join(", "));
    }
    ExitCode::SUCCESS
}

fn run_check_config(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match build_search_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("\nSearch:");
    eprintln!("  trials:          {}", settings.optimizer.trials);
    eprintln!("  initial_cash:    {}", settings.optimizer.backtest.initial_cash);
    eprintln!("  commission_rate: {}", settings.optimizer.backtest.commission_rate);
    eprintln!("  oracle:          {}", settings.oracle);
    eprintln!("  seed:            {}", settings.seed);
    eprintln!("  parallel:        {}", settings.parallel);

    if adapter.has_section("evaluate") {
        match evaluate_params(&adapter) {
            Ok((strategy, params)) => {
                eprintln!("\nEvaluate:");
                eprintln!("  strategy: {}", strategy);
                for (name, value) in params.iter() {
                    eprintln!("  {}: {}", name, value);
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    eprintln!("\nConfig validated successfully");
    ExitCode::SUCCESS
}
