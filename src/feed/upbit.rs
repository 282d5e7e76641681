use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Tick;

pub const TICKER_CHANNEL: &str = "ticker";

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum SubscribeField<'a> {
    Ticket { ticket: &'a str },
    Channel {
        #[serde(rename = "type")]
        kind: &'a str,
        codes: [&'a str; 1],
    },
}

/// Subscription frame naming one instrument on the ticker channel
///
/// `[{"ticket":"..."},{"type":"ticker","codes":["KRW-BTC"]}]`
pub fn subscription_payload(ticket: &str, market: &str) -> serde_json::Result<String> {
    let fields = [
        SubscribeField::Ticket { ticket },
        SubscribeField::Channel {
            kind: TICKER_CHANNEL,
            codes: [market],
        },
    ];

    serde_json::to_string(&fields)
}

#[derive(Debug, Deserialize)]
struct TickerMessage {
    #[serde(rename = "type")]
    kind: Option<String>,
    trade_price: Option<f64>,
    trade_timestamp: Option<i64>,
    timestamp: Option<i64>,
}

/// Decode a raw frame into a tick
///
/// Returns None for anything that is not a ticker message with a usable price.
pub fn parse_ticker(payload: &[u8]) -> Option<Tick> {
    let message: TickerMessage = serde_json::from_slice(payload).ok()?;

    if message.kind.as_deref() != Some(TICKER_CHANNEL) {
        return None;
    }

    let price = message.trade_price?;
    if !price.is_finite() || price <= 0.0 {
        return None;
    }

    let timestamp = message
        .trade_timestamp
        .or(message.timestamp)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now);

    Some(Tick { price, timestamp })
}
