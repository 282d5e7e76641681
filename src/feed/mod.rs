// Live market data: websocket subscription with fixed-delay reconnect
pub mod upbit;

pub use upbit::{parse_ticker, subscription_payload};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::models::Tick;
use crate::settings::FeedConfig;

/// What the feed reports to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    Tick(Tick),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to encode subscription: {0}")]
    Subscribe(#[from] serde_json::Error),

    #[error("event receiver dropped")]
    ReceiverClosed,
}

/// Streaming connection to the price source
///
/// Runs until the event receiver is dropped. Every failure or server close is
/// followed by one reconnect after `reconnect_delay`, with no attempt limit.
/// Attempts run one after another in a single task, so a reconnect can never
/// overlap a connection that is still being established.
#[derive(Debug, Clone)]
pub struct FeedConnection {
    url: String,
    market: String,
    ticket: String,
    reconnect_delay: Duration,
}

impl FeedConnection {
    pub fn new(
        url: impl Into<String>,
        market: impl Into<String>,
        ticket: impl Into<String>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            market: market.into(),
            ticket: ticket.into(),
            reconnect_delay,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.market.clone(),
            config.ticket.clone(),
            Duration::from_secs(config.reconnect_delay_secs),
        )
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// Spawn the feed on the current runtime
    pub fn spawn(self, events: mpsc::Sender<FeedEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(events).await })
    }

    pub async fn run(self, events: mpsc::Sender<FeedEvent>) {
        let mut attempt: u64 = 0;

        loop {
            attempt = attempt.wrapping_add(1);
            tracing::info!(attempt, url = %self.url, market = %self.market, "Connecting to feed");

            match self.session(&events).await {
                Ok(()) => tracing::warn!(attempt, "Feed closed by server"),
                Err(FeedError::ReceiverClosed) => break,
                Err(e) => tracing::warn!(attempt, "Feed connection failed: {}", e),
            }

            if events.send(FeedEvent::Disconnected).await.is_err() {
                break;
            }

            sleep(self.reconnect_delay).await;
        }

        tracing::info!("Feed receiver gone, stopping feed");
    }

    /// One connection lifetime: connect, subscribe, forward ticks until close
    async fn session(&self, events: &mpsc::Sender<FeedEvent>) -> Result<(), FeedError> {
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let subscribe = subscription_payload(&self.ticket, &self.market)?;
        write.send(Message::Text(subscribe)).await?;

        events
            .send(FeedEvent::Connected)
            .await
            .map_err(|_| FeedError::ReceiverClosed)?;

        while let Some(msg) = read.next().await {
            let payload = match msg? {
                Message::Text(text) => text.into_bytes(),
                Message::Binary(bytes) => bytes,
                Message::Close(frame) => {
                    tracing::debug!(?frame, "Received close frame");
                    break;
                }
                // Pings are answered by tungstenite on the next read
                _ => continue,
            };

            match parse_ticker(&payload) {
                Some(tick) => events
                    .send(FeedEvent::Tick(tick))
                    .await
                    .map_err(|_| FeedError::ReceiverClosed)?,
                None => tracing::trace!(len = payload.len(), "Ignoring non-ticker message"),
            }
        }

        Ok(())
    }
}
