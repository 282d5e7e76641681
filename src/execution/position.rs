use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{TradeEvent, TradeSide};

/// All-in / all-out account state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub balance: f64,
    pub quantity: f64,
    pub avg_entry_price: f64, // 0 while flat
}

impl Position {
    pub fn flat(balance: f64) -> Self {
        Self {
            balance,
            quantity: 0.0,
            avg_entry_price: 0.0,
        }
    }

    pub fn state(&self) -> PositionState {
        if self.quantity > 0.0 {
            PositionState::Holding
        } else {
            PositionState::Flat
        }
    }

    /// Unrealized profit rate at `price`, None while flat
    pub fn profit_rate(&self, price: f64) -> Option<f64> {
        if self.quantity > 0.0 && self.avg_entry_price > 0.0 {
            Some((price - self.avg_entry_price) / self.avg_entry_price)
        } else {
            None
        }
    }

    /// Checks the settled-state invariants of a position
    pub fn is_consistent(&self) -> bool {
        let finite = self.balance.is_finite()
            && self.quantity.is_finite()
            && self.avg_entry_price.is_finite();
        let non_negative = self.balance >= 0.0 && self.quantity >= 0.0 && self.avg_entry_price >= 0.0;
        let entry_known = self.quantity == 0.0 || self.avg_entry_price > 0.0;

        finite && non_negative && entry_known
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Holding,
}

/// Mark-to-market view of the account
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub total_value: f64,
    pub pnl: f64,
    pub pnl_rate_pct: f64,
}

/// Owns the position and applies simulated fills with fee accounting
///
/// `buy` and `sell` assert their preconditions: the strategy guards make a
/// violation impossible, so hitting one means the state machine is broken.
#[derive(Debug, Clone)]
pub struct PositionStore {
    position: Position,
    fee_rate: f64,
}

impl PositionStore {
    pub fn new(starting_balance: f64, fee_rate: f64) -> Self {
        Self::with_position(Position::flat(starting_balance), fee_rate)
    }

    /// Restore from a persisted position
    pub fn with_position(position: Position, fee_rate: f64) -> Self {
        Self { position, fee_rate }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn state(&self) -> PositionState {
        self.position.state()
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    /// Spend the whole balance at `price`
    pub fn buy(&mut self, price: f64) -> TradeEvent {
        assert!(
            price.is_finite() && price > 0.0,
            "buy price must be positive, got {}",
            price
        );
        assert!(
            self.position.quantity == 0.0,
            "buy while holding {} units",
            self.position.quantity
        );

        let quantity = self.position.balance * (1.0 - self.fee_rate) / price;

        self.position = Position {
            balance: 0.0,
            quantity,
            avg_entry_price: price,
        };

        tracing::info!(price = %price, quantity = %quantity, "BUY filled");

        TradeEvent {
            id: Uuid::new_v4(),
            side: TradeSide::Buy,
            price,
            quantity,
            profit_rate: None,
            timestamp: Utc::now(),
        }
    }

    /// Liquidate the whole holding at `price`
    pub fn sell(&mut self, price: f64) -> TradeEvent {
        assert!(
            price.is_finite() && price > 0.0,
            "sell price must be positive, got {}",
            price
        );
        assert!(self.position.quantity > 0.0, "sell while flat");

        let quantity = self.position.quantity;
        let avg_entry_price = self.position.avg_entry_price;
        let balance = quantity * price * (1.0 - self.fee_rate);
        let profit_rate = (price - avg_entry_price) / avg_entry_price;

        self.position = Position::flat(balance);

        tracing::info!(
            price = %price,
            balance = %balance,
            profit_pct = %format!("{:.2}", profit_rate * 100.0),
            "SELL filled"
        );

        TradeEvent {
            id: Uuid::new_v4(),
            side: TradeSide::Sell,
            price,
            quantity,
            profit_rate: Some(profit_rate),
            timestamp: Utc::now(),
        }
    }

    /// Total account value at `price` against the starting balance
    pub fn valuation(&self, price: f64, starting_balance: f64) -> Valuation {
        let total_value = self.position.balance + self.position.quantity * price;
        let pnl = total_value - starting_balance;
        let pnl_rate_pct = if starting_balance > 0.0 {
            pnl / starting_balance * 100.0
        } else {
            0.0
        };

        Valuation {
            total_value,
            pnl,
            pnl_rate_pct,
        }
    }
}
