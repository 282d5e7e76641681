// Core modules
pub mod controller;
pub mod execution;
pub mod feed;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod settings;
pub mod strategy;

// Re-export commonly used types
pub use controller::{Controller, ManualTradeOutcome};
pub use models::*;
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
