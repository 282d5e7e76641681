// Price history and simulated fills
pub mod position;
pub mod price_window;

pub use position::{Position, PositionState, PositionStore, Valuation};
pub use price_window::PriceWindow;
