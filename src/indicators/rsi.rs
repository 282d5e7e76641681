use crate::execution::PriceWindow;

/// RSI reported when there is not enough history to say anything
///
/// This is a "no signal" marker, not a measured value.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Calculate Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Gains and losses are summed over every consecutive pair in `prices`, so the
/// slice length (not `period`) decides how many samples contribute. `period`
/// only gates the minimum history; below it the result is [`NEUTRAL_RSI`].
/// A window with no losses divides by 1 instead of 0, which caps RSI at 100.
pub fn calculate_rsi(prices: &[f64], period: usize) -> f64 {
    if prices.len() < period || prices.len() < 2 {
        return NEUTRAL_RSI;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let divisor = if losses == 0.0 { 1.0 } else { losses };
    let rs = gains / divisor;

    100.0 - (100.0 / (1.0 + rs))
}

/// RSI over a [`PriceWindow`]
#[derive(Debug, Clone)]
pub struct RsiEngine {
    period: usize,
}

impl RsiEngine {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn compute(&self, window: &PriceWindow) -> f64 {
        calculate_rsi(&window.values(), self.period)
    }

    /// Whether `rsi` came from real history rather than the neutral default
    pub fn has_signal(&self, window: &PriceWindow) -> bool {
        window.len() >= self.period && window.len() >= 2
    }
}
