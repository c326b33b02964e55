//! Shared test utilities for the price tracker.
//!
//! This module provides helpers for setting up test databases, building records
//! and product pages with sensible defaults, and a scripted [`PageFetcher`] that
//! records every URL it is asked for.
#![allow(clippy::unwrap_used)]

use crate::{
    config,
    core::{
        Coordinator, FetchedPage, PageFetcher, ProductRepository, Retailer, StoreService,
        retailers::{Woolworths, woolworths},
    },
    entities::ProductRecord,
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, prelude::Date};
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{Arc, Mutex},
};
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

pub async fn setup_test_repository() -> Result<ProductRepository> {
    Ok(ProductRepository::new(setup_test_db().await?))
}

/// Fixed capture date: 2024-05-01
pub fn test_date() -> Date {
    Date::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Creates a record with sensible defaults.
///
/// # Defaults
/// * `product_name`: "Test Product {stockcode}"
/// * not on special, was price 0, package "1KG", unit price 1.5 per 100G
pub fn sample_record(store: &str, stockcode: &str, date: Date, price: f64) -> ProductRecord {
    ProductRecord {
        date,
        stockcode: stockcode.to_string(),
        store: store.to_string(),
        product_name: format!("Test Product {stockcode}"),
        price,
        is_on_special: false,
        is_half_price: false,
        was_price: 0.0,
        savings_amount: 0.0,
        package_size: "1KG".to_string(),
        unit_weight_in_grams: 1000.0,
        cup_price: Some(1.5),
        cup_measure: Some("100G".to_string()),
        cup_string: Some("$1.50 / 100G".to_string()),
    }
}

/// A Woolworths-style product page embedding the given name and price.
///
/// The rest of the payload is fixed: on special (was 5.00, saving 0.50),
/// package "2l", 2000 g, $2.25 / 1L.
pub fn woolworths_page(name: &str, price: f64) -> String {
    let payload = serde_json::json!({
        "Product": {
            "Stockcode": 123_456,
            "Name": name,
            "Price": price,
            "IsOnSpecial": true,
            "IsHalfPrice": false,
            "WasPrice": 5.0,
            "SavingsAmount": 0.5,
            "PackageSize": "2l",
            "UnitWeightInGrams": 2000.0,
            "CupPrice": 2.25,
            "CupMeasure": "1L",
            "CupString": "$2.25 / 1L"
        }
    });
    format!(
        "<!doctype html><html><head><title>{name}</title></head><body>\
         <div id=\"root\"></div>\n{}\n{payload}\n</script></body></html>",
        woolworths::MARKER
    )
}

/// [`PageFetcher`] that answers from a fixed URL → response table.
///
/// Unknown URLs get a 404. Every call is recorded, in order.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, FetchedPage>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, page: FetchedPage) {
        self.pages.lock().unwrap().insert(url.to_string(), page);
    }

    /// Makes `url` fail like a timed-out connection.
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.to_string());

        if self.failing.lock().unwrap().contains(url) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "operation timed out",
            )));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchedPage::status(404)))
    }
}

/// Woolworths-shaped retailer under an arbitrary store id, served from
/// `https://{id}.test/product` with the id lowercased as URL hosts are.
pub struct TestRetailer {
    id: String,
    base_url: String,
    inner: Woolworths,
}

impl TestRetailer {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            base_url: format!("https://{}.test/product", id.to_ascii_lowercase()),
            inner: Woolworths::default(),
        }
    }
}

impl Retailer for TestRetailer {
    fn id(&self) -> &str {
        &self.id
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn marker(&self) -> &str {
        self.inner.marker()
    }

    fn map_to_record(
        &self,
        payload: Value,
        stockcode: &str,
        date: Date,
    ) -> serde_json::Result<ProductRecord> {
        let mut record = self.inner.map_to_record(payload, stockcode, date)?;
        record.store.clone_from(&self.id);
        Ok(record)
    }
}

/// Coordinator over [`TestRetailer`]s registered in the given order, all sharing
/// one scripted fetcher.
pub fn test_coordinator(store_ids: &[&str]) -> (Coordinator, Arc<ScriptedFetcher>) {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let services = store_ids
        .iter()
        .map(|id| {
            StoreService::new(
                Box::new(TestRetailer::new(id)),
                Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
            )
        })
        .collect();
    (Coordinator::new(services).unwrap(), fetcher)
}
