use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Strategy parameters, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    /// Minimum samples before RSI is considered meaningful
    pub rsi_period: usize,

    /// Price window capacity
    pub window_capacity: usize,

    /// Buy when RSI drops below this
    pub entry_threshold: f64,

    /// Sell when unrealized profit rate exceeds this (0.05 = +5%)
    pub take_profit_rate: f64,

    /// Sell when unrealized profit rate falls below the negation of this (0.03 = -3%)
    pub stop_loss_rate: f64,

    /// Fee charged on each side of a round trip (0.0005 = 0.05%)
    pub fee_rate: f64,

    /// Cash balance of a fresh account
    pub starting_balance: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            window_capacity: 20,
            entry_threshold: 30.0,
            take_profit_rate: 0.05,
            stop_loss_rate: 0.03,
            fee_rate: 0.0005,
            starting_balance: 10_000_000.0,
        }
    }
}

impl StrategyConfig {
    /// Reject parameters under which the bot could never trade or could go negative
    pub fn validate(&self) -> Result<()> {
        self.validate_window()?;
        self.validate_rates()?;

        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(format!("Invalid starting balance: {}", self.starting_balance).into());
        }
        Ok(())
    }

    /// RSI needs at least one price change and must fit inside the window
    fn validate_window(&self) -> Result<()> {
        if self.window_capacity < 2 {
            return Err(format!(
                "Window capacity must be at least 2, got {}",
                self.window_capacity
            )
            .into());
        }
        if self.rsi_period < 2 {
            return Err(format!("RSI period must be at least 2, got {}", self.rsi_period).into());
        }
        if self.rsi_period > self.window_capacity {
            return Err(format!(
                "RSI period ({}) exceeds window capacity ({})",
                self.rsi_period, self.window_capacity
            )
            .into());
        }
        Ok(())
    }

    fn validate_rates(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(format!("Fee rate must be in [0, 1), got {}", self.fee_rate).into());
        }
        if !(0.0..=100.0).contains(&self.entry_threshold) {
            return Err(format!(
                "Entry threshold must be in [0, 100], got {}",
                self.entry_threshold
            )
            .into());
        }
        if !self.take_profit_rate.is_finite() || self.take_profit_rate < 0.0 {
            return Err(format!("Invalid take-profit rate: {}", self.take_profit_rate).into());
        }
        if !self.stop_loss_rate.is_finite() || self.stop_loss_rate < 0.0 {
            return Err(format!("Invalid stop-loss rate: {}", self.stop_loss_rate).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    /// Instrument code, e.g. KRW-BTC
    pub market: String,
    pub ticket: String,
    pub reconnect_delay_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://api.upbit.com/websocket/v1".to_string(),
            market: "KRW-BTC".to_string(),
            ticket: "NEXUS_MOBILE".to_string(),
            reconnect_delay_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    File,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    /// Single key holding the snapshot
    pub key: String,
    /// Snapshot file for the file backend
    pub path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key: "nexus_mobile_state".to_string(),
            path: "nexus_mobile_state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub strategy: StrategyConfig,
    pub feed: FeedConfig,
    pub persistence: PersistenceConfig,
}

impl Settings {
    /// Load settings: defaults, then an optional TOML file, then `NEXUSBOT_*` env vars
    ///
    /// Nested keys use a double underscore, e.g. `NEXUSBOT_FEED__MARKET=KRW-ETH`.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("NEXUSBOT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings
            .strategy
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("strategy: {}", e)))?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_defaults() {
        let config = StrategyConfig::default();

        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.window_capacity, 20);
        assert_eq!(config.entry_threshold, 30.0);
        assert_eq!(config.take_profit_rate, 0.05);
        assert_eq!(config.stop_loss_rate, 0.03);
        assert_eq!(config.fee_rate, 0.0005);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.strategy, StrategyConfig::default());
        assert_eq!(settings.feed.market, "KRW-BTC");
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("nexusbot-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[strategy]\nentry_threshold = 25.0\n\n[persistence]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(settings.strategy.entry_threshold, 25.0);
        assert_eq!(settings.strategy.rsi_period, 14);
        assert_eq!(settings.persistence.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_default_strategy_is_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unreachable_period() {
        let config = StrategyConfig {
            rsi_period: 21,
            ..StrategyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds window capacity"));

        let config = StrategyConfig {
            window_capacity: 0,
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StrategyConfig {
            rsi_period: 1,
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_money_parameters() {
        for config in [
            StrategyConfig { fee_rate: 1.0, ..StrategyConfig::default() },
            StrategyConfig { fee_rate: -0.01, ..StrategyConfig::default() },
            StrategyConfig { starting_balance: -1.0, ..StrategyConfig::default() },
            StrategyConfig { starting_balance: f64::NAN, ..StrategyConfig::default() },
            StrategyConfig { entry_threshold: 120.0, ..StrategyConfig::default() },
            StrategyConfig { take_profit_rate: -0.05, ..StrategyConfig::default() },
            StrategyConfig { stop_loss_rate: f64::INFINITY, ..StrategyConfig::default() },
        ] {
            assert!(config.validate().is_err(), "accepted {:?}", config);
        }

        // An empty account is allowed; it just never buys
        let config = StrategyConfig {
            starting_balance: 0.0,
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_strategy() {
        let path = std::env::temp_dir().join(format!("nexusbot-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[strategy]\nrsi_period = 21\n").unwrap();

        let result = Settings::load(Some(path.as_path()));
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(matches!(err, config::ConfigError::Message(_)));
        assert!(err.to_string().contains("exceeds window capacity"));
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("Redis".parse::<StoreBackend>().unwrap(), StoreBackend::Redis);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
