//! Portfolio state for a single simulation run.

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub positions: Vec<Position>,
    pub closed_trades: Vec<ClosedTrade>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            positions: Vec::new(),
            closed_trades: Vec::new(),
        }
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Remove and return the positions matching `pred`, preserving the order
    /// of those left behind.
    pub fn take_positions_where<F>(&mut self, mut pred: F) -> Vec<Position>
    where
        F: FnMut(&Position) -> bool,
    {
        let (taken, kept): (Vec<Position>, Vec<Position>) =
            self.positions.drain(..).partition(|p| pred(p));
        self.positions = kept;
        taken
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }
}
