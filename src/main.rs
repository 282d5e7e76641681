use anyhow::Context;
use clap::Parser;
use nexusbot::feed::{FeedConnection, FeedEvent};
use nexusbot::notify::TracingNotifier;
use nexusbot::persistence::{FileStore, MemoryStore, RedisStore, SnapshotStore};
use nexusbot::settings::{Settings, StoreBackend};
use nexusbot::{Controller, TradeSide};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const FEED_CHANNEL_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-asset RSI auto-trading controller")]
struct Args {
    /// Settings file (TOML); missing file falls back to defaults
    #[arg(short, long, default_value = "nexusbot.toml")]
    config: PathBuf,

    /// Snapshot backend: redis, file or memory
    #[arg(short, long)]
    store: Option<StoreBackend>,

    /// Instrument to trade, e.g. KRW-BTC
    #[arg(short, long)]
    market: Option<String>,

    /// Start auto-trading immediately
    #[arg(long)]
    autostart: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();

    // rustls 0.23 needs a process-wide crypto provider before the first wss:// connect
    if rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed, keeping it");
    }

    let mut settings = Settings::load(Some(args.config.as_path()))
        .with_context(|| format!("failed to load settings from {}", args.config.display()))?;
    if let Some(store) = args.store {
        settings.persistence.backend = store;
    }
    if let Some(market) = args.market {
        settings.feed.market = market;
    }

    tracing::info!("🚀 Nexusbot starting");
    tracing::info!("📊 Configuration:");
    tracing::info!("  Market: {}", settings.feed.market);
    tracing::info!("  Starting balance: {:.0}", settings.strategy.starting_balance);
    tracing::info!(
        "  Entry: RSI({}) < {} | TP +{}% | SL -{}% | Fee {}%",
        settings.strategy.rsi_period,
        settings.strategy.entry_threshold,
        settings.strategy.take_profit_rate * 100.0,
        settings.strategy.stop_loss_rate * 100.0,
        settings.strategy.fee_rate * 100.0
    );
    tracing::info!("  Store: {:?}", settings.persistence.backend);

    match settings.persistence.backend {
        StoreBackend::Redis => {
            let store = RedisStore::new(&settings.persistence.redis_url, &settings.persistence.key)
                .await
                .context("failed to connect to Redis")?;
            run(settings, store, args.autostart).await
        }
        StoreBackend::File => {
            let store = FileStore::new(&settings.persistence.path);
            run(settings, store, args.autostart).await
        }
        StoreBackend::Memory => run(settings, MemoryStore::new(), args.autostart).await,
    }
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nexusbot=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run<S: SnapshotStore>(settings: Settings, store: S, autostart: bool) -> anyhow::Result<()> {
    let mut controller = Controller::restore(settings.strategy.clone(), store, TracingNotifier).await;

    if autostart && !controller.is_running() {
        controller.start().await;
    }

    let (feed_tx, mut feed_rx) = mpsc::channel::<FeedEvent>(FEED_CHANNEL_CAPACITY);
    let feed_task = FeedConnection::from_config(&settings.feed).spawn(feed_tx);

    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    tracing::info!("Commands: start | stop | toggle | buy | sell | status");
    tracing::info!("Press Ctrl+C to stop...");

    loop {
        tokio::select! {
            event = feed_rx.recv() => match event {
                Some(event) => {
                    controller.handle_event(event).await;
                }
                None => {
                    tracing::error!("Feed task exited");
                    break;
                }
            },
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_command(&mut controller, line.trim()).await,
                Ok(None) => {
                    tracing::debug!("stdin closed, operator commands disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!("Failed to read command: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    feed_task.abort();
    tracing::info!("👋 Nexusbot stopped");
    Ok(())
}

async fn handle_command<S: SnapshotStore>(controller: &mut Controller<S, TracingNotifier>, command: &str) {
    match command.to_ascii_lowercase().as_str() {
        "" => {}
        "start" => controller.start().await,
        "stop" => controller.stop().await,
        "toggle" => {
            controller.toggle().await;
        }
        "buy" => {
            controller.request_manual_trade(TradeSide::Buy);
        }
        "sell" => {
            controller.request_manual_trade(TradeSide::Sell);
        }
        "status" => {
            let position = controller.position();
            tracing::info!(
                running = controller.is_running(),
                state = ?controller.state(),
                balance = %position.balance,
                quantity = %position.quantity,
                avg_entry_price = %position.avg_entry_price,
                rsi = ?controller.last_rsi(),
                window = controller.window().len(),
                "Status"
            );
        }
        other => tracing::warn!("Unknown command: {}", other),
    }
}
