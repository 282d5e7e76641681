// Trading strategy module
pub mod rsi_threshold;

pub use rsi_threshold::RsiThresholdStrategy;

use crate::execution::{Position, PositionStore};
use crate::models::TradeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

/// Outcome of one evaluation of the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Hold,
    Enter,
    Exit(ExitReason),
}

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Pure transition function over the current position, price and RSI
    fn decide(&self, position: &Position, price: f64, rsi: f64) -> Decision;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Evaluate and execute against the store, returning the fill if one happened
    fn evaluate(&self, store: &mut PositionStore, price: f64, rsi: f64) -> Option<TradeEvent> {
        match self.decide(store.position(), price, rsi) {
            Decision::Hold => None,
            Decision::Enter => Some(store.buy(price)),
            Decision::Exit(reason) => {
                tracing::debug!(?reason, price = %price, "Exit triggered");
                Some(store.sell(price))
            }
        }
    }
}
