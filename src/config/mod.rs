/// Application settings loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, HttpSettings, StoreConfig, load_config, load_or_default};
