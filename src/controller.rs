use crate::execution::{Position, PositionState, PositionStore, PriceWindow};
use crate::feed::FeedEvent;
use crate::indicators::RsiEngine;
use crate::models::{Notification, RunState, Tick, TradeEvent, TradeSide};
use crate::notify::Notifier;
use crate::persistence::{PersistenceGateway, SnapshotStore};
use crate::settings::StrategyConfig;
use crate::strategy::{RsiThresholdStrategy, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualTradeOutcome {
    /// Paused; the user was warned
    Rejected,
    /// Accepted and logged; no execution backend is wired
    Logged,
}

/// Top-level orchestrator
///
/// Owns the run flag, the price window and the position, and drives
/// window -> RSI -> strategy -> persistence for each tick while running.
/// Everything runs on one task, so each tick completes before the next is taken.
pub struct Controller<S, N> {
    config: StrategyConfig,
    window: PriceWindow,
    indicator: RsiEngine,
    positions: PositionStore,
    strategy: Box<dyn Strategy>,
    run_state: RunState,
    persistence: PersistenceGateway<S>,
    notifier: N,
    last_rsi: Option<f64>,
}

impl<S: SnapshotStore, N: Notifier> Controller<S, N> {
    /// Fresh controller: starting balance, flat, paused
    pub fn new(config: StrategyConfig, store: S, notifier: N) -> Self {
        let position = Position::flat(config.starting_balance);
        Self::assemble(config, PersistenceGateway::new(store), notifier, position, RunState::default())
    }

    /// Resume from the last snapshot, falling back to defaults when there is none
    pub async fn restore(config: StrategyConfig, store: S, notifier: N) -> Self {
        let mut persistence = PersistenceGateway::new(store);

        let (position, run_state) = match persistence.load().await {
            Some(snapshot) => (snapshot.position, snapshot.run_state),
            None => (Position::flat(config.starting_balance), RunState::default()),
        };

        let controller = Self::assemble(config, persistence, notifier, position, run_state);

        tracing::info!(
            state = ?controller.state(),
            running = run_state.is_running,
            balance = %position.balance,
            quantity = %position.quantity,
            "Controller restored"
        );

        if run_state.is_running {
            controller.notify(Notification::system("Resuming auto-trading from saved state"));
        }

        controller
    }

    fn assemble(
        config: StrategyConfig,
        persistence: PersistenceGateway<S>,
        notifier: N,
        position: Position,
        run_state: RunState,
    ) -> Self {
        Self {
            window: PriceWindow::new(config.window_capacity),
            indicator: RsiEngine::new(config.rsi_period),
            positions: PositionStore::with_position(position, config.fee_rate),
            strategy: Box::new(RsiThresholdStrategy::new(&config)),
            run_state,
            persistence,
            notifier,
            last_rsi: None,
            config,
        }
    }

    /// Swap the strategy driving the state machine
    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running
    }

    pub fn position(&self) -> &Position {
        self.positions.position()
    }

    pub fn state(&self) -> PositionState {
        self.positions.state()
    }

    pub fn window(&self) -> &PriceWindow {
        &self.window
    }

    /// RSI computed on the last processed tick
    pub fn last_rsi(&self) -> Option<f64> {
        self.last_rsi
    }

    pub fn persistence(&self) -> &PersistenceGateway<S> {
        &self.persistence
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub async fn start(&mut self) {
        self.run_state.is_running = true;
        self.save().await;
        tracing::info!(strategy = self.strategy.name(), "Auto-trading started");
        self.notify(Notification::system("Auto-trading started"));
    }

    /// Pause evaluation; the feed stays connected
    pub async fn stop(&mut self) {
        self.run_state.is_running = false;
        self.save().await;
        tracing::info!("Auto-trading stopped");
        self.notify(Notification::system("Auto-trading stopped"));
    }

    /// Flip between running and paused, returning the new mode
    pub async fn toggle(&mut self) -> bool {
        if self.run_state.is_running {
            self.stop().await;
        } else {
            self.start().await;
        }
        self.run_state.is_running
    }

    /// Manual order request from the operator
    pub fn request_manual_trade(&self, side: TradeSide) -> ManualTradeOutcome {
        if !self.run_state.is_running {
            tracing::warn!(%side, "Manual trade rejected: system paused");
            self.notify(Notification::system(
                "Start the system before placing a manual trade",
            ));
            return ManualTradeOutcome::Rejected;
        }

        tracing::info!(%side, "Manual trade requested");
        self.notify(Notification::new(
            side.into(),
            format!("{} manual order requested", side),
        ));
        ManualTradeOutcome::Logged
    }

    pub async fn handle_event(&mut self, event: FeedEvent) -> Option<TradeEvent> {
        match event {
            FeedEvent::Connected => {
                self.notify(Notification::system("Market feed connected"));
                None
            }
            FeedEvent::Disconnected => {
                self.notify(Notification::system("Market feed disconnected, reconnecting"));
                None
            }
            FeedEvent::Tick(tick) => self.on_tick(tick).await,
        }
    }

    /// Run one tick through the pipeline; ignored while paused
    pub async fn on_tick(&mut self, tick: Tick) -> Option<TradeEvent> {
        if !self.run_state.is_running {
            tracing::trace!(price = %tick.price, "Paused, tick dropped");
            return None;
        }

        self.window.push(tick.price);
        let rsi = self.indicator.compute(&self.window);
        self.last_rsi = Some(rsi);

        let valuation = self
            .positions
            .valuation(tick.price, self.config.starting_balance);
        let rsi_label = if self.indicator.has_signal(&self.window) {
            format!("{:.1}", rsi)
        } else {
            format!("{:.1} (warming up {}/{})", rsi, self.window.len(), self.indicator.period())
        };
        self.notify(Notification::system(format!(
            "Price {:.0} | RSI {} | Total {:.0} ({:+.0}, {:+.2}%)",
            tick.price, rsi_label, valuation.total_value, valuation.pnl, valuation.pnl_rate_pct
        )));

        let trade = self.strategy.evaluate(&mut self.positions, tick.price, rsi)?;

        self.save().await;
        self.notify(Notification::new(trade.side.into(), trade_message(&trade)));

        Some(trade)
    }

    async fn save(&mut self) {
        self.persistence
            .save(self.positions.position(), self.run_state)
            .await;
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}

fn trade_message(trade: &TradeEvent) -> String {
    match (trade.side, trade.profit_rate) {
        (TradeSide::Sell, Some(rate)) => {
            format!("SELL: {:.0} ({:+.2}%)", trade.price, rate * 100.0)
        }
        (side, _) => format!("{}: {:.0} (qty {:.8})", side, trade.price, trade.quantity),
    }
}

