//! Position tracking and management.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_price: f64,
    pub shares: u32,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
}

impl Position {
    /// Long position with stop/take prices at fractional distances from entry.
    pub fn open(
        entry_index: usize,
        entry_price: f64,
        shares: u32,
        stop_loss: f64,
        take_profit: f64,
    ) -> Self {
        Position {
            entry_index,
            entry_price,
            shares,
            stop_loss_price: entry_price * (1.0 - stop_loss),
            take_profit_price: entry_price * (1.0 + take_profit),
        }
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        price <= self.stop_loss_price
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        price >= self.take_profit_price
    }

    /// Why this position must close at `price`, if it must.
    pub fn trigger(&self, price: f64) -> Option<ExitReason> {
        if self.should_stop_loss(price) {
            Some(ExitReason::StopLoss)
        } else if self.should_take_profit(price) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub shares: u32,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position::open(3, 50.0, 100, 0.10, 0.20)
    }

    #[test]
    fn open_derives_thresholds_from_entry() {
        let pos = sample_position();
        assert!((pos.stop_loss_price - 45.0).abs() < 1e-9);
        assert!((pos.take_profit_price - 60.0).abs() < 1e-9);
        assert_eq!(pos.entry_index, 3);
    }

    #[test]
    fn stop_loss_triggered() {
        let pos = sample_position();
        assert!(pos.should_stop_loss(44.0));
        assert!(pos.should_stop_loss(pos.stop_loss_price));
        assert!(!pos.should_stop_loss(46.0));
    }

    #[test]
    fn take_profit_triggered() {
        let pos = sample_position();
        assert!(pos.should_take_profit(61.0));
        assert!(pos.should_take_profit(pos.take_profit_price));
        assert!(!pos.should_take_profit(59.0));
    }

    #[test]
    fn trigger_reason() {
        let pos = sample_position();
        assert_eq!(pos.trigger(40.0), Some(ExitReason::StopLoss));
        assert_eq!(pos.trigger(70.0), Some(ExitReason::TakeProfit));
        assert_eq!(pos.trigger(50.0), None);
    }
}
