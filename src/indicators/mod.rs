// Technical indicators module
// RSI momentum oscillator over the rolling price window

pub mod rsi;

pub use rsi::{calculate_rsi, RsiEngine, NEUTRAL_RSI};
