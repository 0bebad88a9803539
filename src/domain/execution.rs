//! Trade execution and fill simulation.
//!
//! Fills happen at the bar's close. Commission is a rate applied
//! multiplicatively: entries cost `price * (1 + rate)` per share, exits
//! return `price * (1 - rate)` per share.

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, ExitReason, Position};

/// Cash needed to buy `shares` at `price`, commission included.
pub fn entry_cost(price: f64, shares: u32, commission_rate: f64) -> f64 {
    price * (1.0 + commission_rate) * shares as f64
}

/// Cash received for selling `shares` at `price`, commission deducted.
pub fn exit_proceeds(price: f64, shares: u32, commission_rate: f64) -> f64 {
    price * shares as f64 * (1.0 - commission_rate)
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { cost: f64 },
    InsufficientCapital,
}

/// Enter a long position at `price`.
///
/// Refuses the entry if the full cost exceeds available cash, so cash never
/// goes negative.
pub fn enter_long(
    portfolio: &mut Portfolio,
    index: usize,
    price: f64,
    shares: u32,
    stop_loss: f64,
    take_profit: f64,
    commission_rate: f64,
) -> EntryResult {
    let cost = entry_cost(price, shares, commission_rate);
    if cost > portfolio.cash {
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= cost;
    portfolio.add_position(Position::open(index, price, shares, stop_loss, take_profit));

    EntryResult::Entered { cost }
}

/// Close `position` at `price`, crediting proceeds and recording the trade.
pub fn exit_position(
    portfolio: &mut Portfolio,
    position: Position,
    index: usize,
    price: f64,
    reason: ExitReason,
    commission_rate: f64,
) -> f64 {
    let proceeds = exit_proceeds(price, position.shares, commission_rate);
    let cost = entry_cost(position.entry_price, position.shares, commission_rate);
    portfolio.cash += proceeds;

    portfolio.record_trade(ClosedTrade {
        entry_index: position.entry_index,
        exit_index: index,
        shares: position.shares,
        entry_price: position.entry_price,
        exit_price: price,
        pnl: proceeds - cost,
        reason,
    });

    proceeds
}

/// Close every open position whose stop-loss or take-profit is met at `price`.
///
/// Returns the number of positions exited.
pub fn check_triggers(
    portfolio: &mut Portfolio,
    index: usize,
    price: f64,
    commission_rate: f64,
) -> usize {
    let triggered = portfolio.take_positions_where(|pos| pos.trigger(price).is_some());
    let count = triggered.len();

    for position in triggered {
        let reason = position.trigger(price).unwrap_or(ExitReason::Signal);
        exit_position(portfolio, position, index, price, reason, commission_rate);
    }

    count
}

/// Close every position opened before bar `index` on a sell signal.
pub fn exit_on_signal(
    portfolio: &mut Portfolio,
    index: usize,
    price: f64,
    commission_rate: f64,
) -> usize {
    let closing = portfolio.take_positions_where(|pos| pos.entry_index < index);
    let count = closing.len();

    for position in closing {
        exit_position(
            portfolio,
            position,
            index,
            price,
            ExitReason::Signal,
            commission_rate,
        );
    }

    count
}
