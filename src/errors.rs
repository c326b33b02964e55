use thiserror::Error;

/// Unified error type for the price tracker.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Nothing could be extracted for this stockcode. Transport failures,
    /// unexpected statuses and malformed payloads all end up here.
    #[error("Product '{stockcode}' not found at store '{store}'")]
    ProductNotFound { store: String, stockcode: String },

    #[error("Invalid stockcode '{stockcode}' for store '{store}': stockcode cannot be empty")]
    InvalidStockcode { store: String, stockcode: String },

    #[error("Unsupported store: '{store}'")]
    UnsupportedStore { store: String },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
