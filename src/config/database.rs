//! Database configuration module for the price tracker.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. There are
//! no migrations; creation is idempotent.

use crate::entities::ProductRecordEntity;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env::{self, VarError};
use std::path::Path;
use tracing::{debug, info};

/// Default location of the local product database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/products.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path when it is unset.
///
/// # Errors
/// Returns `Error::EnvVar` if the variable is set but is not valid Unicode.
pub fn get_database_url() -> Result<String> {
    database_url_from(env::var("DATABASE_URL"))
}

fn database_url_from(value: std::result::Result<String, VarError>) -> Result<String> {
    match value {
        Ok(url) => Ok(url),
        Err(VarError::NotPresent) => Ok(DEFAULT_DATABASE_URL.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first, since
/// `SQLite` will create the file but not the folder it lives in.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_parent(database_url) {
        debug!("Ensuring database directory exists: {}", parent.display());
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::connect(database_url).await?;
    info!("Connected to database at {}", database_url);
    Ok(db)
}

/// Creates the product records table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_records = schema.create_table_from_entity(ProductRecordEntity);
    product_records.if_not_exists();

    db.execute(builder.build(&product_records)).await?;
    Ok(())
}

fn sqlite_file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")?
        .split('?')
        .next()
        .filter(|p| !p.is_empty() && !p.contains(":memory:"))?;

    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
