//! Backtest engine: the bar-by-bar portfolio simulation.
//!
//! Per bar, in series order:
//! 1. close every open position whose stop-loss or take-profit is met
//! 2. skip signal handling if one full-size entry is unaffordable
//! 3. open a position if any active indicator signals buy
//! 4. close positions from earlier bars if any active indicator signals sell
//!
//! Positions still open after the last bar are not liquidated; the result is
//! cash only.

use crate::domain::error::StratsearchError;
use crate::domain::execution::{check_triggers, enter_long, entry_cost, exit_on_signal};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::params::TradeParams;
use crate::domain::portfolio::Portfolio;
use crate::domain::signal::SignalMatrix;

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.0125;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    /// Fraction of trade value charged on both entry and exit.
    pub commission_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub final_cash: f64,
    pub portfolio: Portfolio,
    /// Bars on which signal handling was skipped for lack of cash.
    pub gated_bars: usize,
}

pub fn run_backtest(
    series: &PriceSeries,
    signals: &SignalMatrix,
    trade: &TradeParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratsearchError> {
    if signals.len() != series.len() {
        return Err(StratsearchError::Data {
            reason: format!(
                "signal matrix covers {} bars but series has {}",
                signals.len(),
                series.len()
            ),
        });
    }

    let rate = config.commission_rate;
    let mut portfolio = Portfolio::new(config.initial_cash);
    let mut gated_bars = 0;

    for (i, bar) in series.bars().iter().enumerate() {
        let close = bar.close;

        check_triggers(&mut portfolio, i, close, rate);

        if portfolio.cash < entry_cost(close, trade.n_shares, rate) {
            gated_bars += 1;
            continue;
        }

        if signals.any_buy(i) {
            enter_long(
                &mut portfolio,
                i,
                close,
                trade.n_shares,
                trade.stop_loss,
                trade.take_profit,
                rate,
            );
        }

        if signals.any_sell(i) {
            exit_on_signal(&mut portfolio, i, close, rate);
        }
    }

    Ok(BacktestResult {
        final_cash: portfolio.cash,
        portfolio,
        gated_bars,
    })
}

/// Final cash of one simulation run; the optimizer's objective.
pub fn final_cash(
    series: &PriceSeries,
    signals: &SignalMatrix,
    trade: &TradeParams,
    config: &BacktestConfig,
) -> Result<f64, StratsearchError> {
    run_backtest(series, signals, trade, config).map(|r| r.final_cash)
}
