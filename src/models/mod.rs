use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One trade-price update from the market feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Result of a simulated fill against the position store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeEvent {
    pub id: Uuid,
    pub side: TradeSide,
    pub price: f64,
    /// Quantity bought, or quantity sold
    pub quantity: f64,
    /// Realized profit rate, only set on sells
    pub profit_rate: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Run/pause flag, persisted with the position
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    pub is_running: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    System,
    Buy,
    Sell,
}

impl From<TradeSide> for NotificationCategory {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => NotificationCategory::Buy,
            TradeSide::Sell => NotificationCategory::Sell,
        }
    }
}

/// Structured event handed to the UI collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub category: NotificationCategory,
}

impl Notification {
    pub fn new(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            category,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(NotificationCategory::System, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_side_category() {
        assert_eq!(NotificationCategory::from(TradeSide::Buy), NotificationCategory::Buy);
        assert_eq!(NotificationCategory::from(TradeSide::Sell), NotificationCategory::Sell);
    }

    #[test]
    fn test_notification_serializes_lowercase_category() {
        let n = Notification::system("connected");
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["category"], "system");
        assert_eq!(json["message"], "connected");
    }
}
