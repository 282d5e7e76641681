use crate::execution::{Position, PositionState};
use crate::settings::StrategyConfig;
use crate::strategy::{Decision, ExitReason, Strategy};

/// Oversold entry with fixed take-profit / stop-loss exits
///
/// Entry (FLAT -> HOLDING):
/// - RSI below `entry_threshold`
///
/// Exit (HOLDING -> FLAT), either of:
/// - Profit rate above `take_profit_rate`
/// - Profit rate below `-stop_loss_rate`
#[derive(Debug, Clone)]
pub struct RsiThresholdStrategy {
    entry_threshold: f64,
    take_profit_rate: f64,
    stop_loss_rate: f64,
}

impl RsiThresholdStrategy {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            entry_threshold: config.entry_threshold,
            take_profit_rate: config.take_profit_rate,
            stop_loss_rate: config.stop_loss_rate,
        }
    }
}

impl Default for RsiThresholdStrategy {
    fn default() -> Self {
        Self::new(&StrategyConfig::default())
    }
}

impl Strategy for RsiThresholdStrategy {
    fn decide(&self, position: &Position, price: f64, rsi: f64) -> Decision {
        match position.state() {
            PositionState::Flat => {
                // No cash, nothing to buy with
                if position.balance <= 0.0 {
                    return Decision::Hold;
                }

                if rsi < self.entry_threshold {
                    tracing::debug!(rsi = %format!("{:.1}", rsi), "Oversold entry");
                    Decision::Enter
                } else {
                    Decision::Hold
                }
            }
            PositionState::Holding => {
                let profit_rate = match position.profit_rate(price) {
                    Some(rate) => rate,
                    None => return Decision::Hold,
                };

                if profit_rate > self.take_profit_rate {
                    Decision::Exit(ExitReason::TakeProfit)
                } else if profit_rate < -self.stop_loss_rate {
                    Decision::Exit(ExitReason::StopLoss)
                } else {
                    Decision::Hold
                }
            }
        }
    }

    fn name(&self) -> &str {
        "RSI Threshold"
    }
}
