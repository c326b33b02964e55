//! Coordinator - fans stockcode lists out across the registered stores.
//!
//! Stores are visited serially in registration order and each store's batch is
//! fail-fast, so one store's failure aborts the whole update before any later
//! store is contacted. There is no partial-success mode.

use crate::config::AppConfig;
use crate::core::fetch::{HttpFetcher, PageFetcher};
use crate::core::repository::StockcodeIndex;
use crate::core::service::StoreService;
use crate::entities::ProductRecord;
use crate::errors::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Registry of store services in registration order.
pub struct Coordinator {
    services: Vec<StoreService>,
}

impl Coordinator {
    /// # Errors
    /// Returns `Error::Config` if two services share a store id, ignoring case.
    pub fn new(services: Vec<StoreService>) -> Result<Self> {
        for (i, service) in services.iter().enumerate() {
            if services[..i]
                .iter()
                .any(|earlier| earlier.store_id().eq_ignore_ascii_case(service.store_id()))
            {
                return Err(Error::Config {
                    message: format!("Store '{}' is registered twice", service.store_id()),
                });
            }
        }
        Ok(Self { services })
    }

    /// Builds one service per configured store, all sharing one HTTP client.
    ///
    /// # Errors
    /// Returns an error if a store id is unknown or repeated, or if the HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        let services = config
            .stores
            .iter()
            .map(|store| {
                store
                    .build_retailer()
                    .map(|retailer| StoreService::new(retailer, Arc::clone(&fetcher)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(services)
    }

    /// Registered store ids, in registration order.
    pub fn store_ids(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(StoreService::store_id)
    }

    /// Refreshes every store named in `index`.
    ///
    /// Stores missing from `index` or with an empty list are skipped, as are
    /// entries for stores that are not registered. Results keep registration
    /// order, then input order within a store.
    ///
    /// # Errors
    /// Propagates the first store failure; later stores are not contacted.
    #[instrument(skip(self, index), fields(stores = index.len()))]
    pub async fn update_all(&self, index: &StockcodeIndex) -> Result<Vec<ProductRecord>> {
        let mut all_records = Vec::new();

        for service in &self.services {
            let Some(stockcodes) = index.get(service.store_id()).filter(|s| !s.is_empty()) else {
                debug!("Nothing to update for {}", service.store_id());
                continue;
            };
            let records = service.get_by_stockcodes(stockcodes).await?;
            all_records.extend(records);
        }

        info!("Updated {} products across all stores", all_records.len());
        Ok(all_records)
    }

    /// Fetches a single product from the named store.
    ///
    /// Store ids match the way config ids do: case-insensitive, surrounding
    /// whitespace ignored.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedStore` for an unregistered store, otherwise
    /// whatever the store's lookup returns.
    pub async fn get_one(&self, stockcode: &str, store_id: &str) -> Result<ProductRecord> {
        let wanted = store_id.trim();
        let service = self
            .services
            .iter()
            .find(|service| service.store_id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnsupportedStore {
                store: store_id.to_string(),
            })?;
        service.get_by_stockcode(stockcode).await
    }
}
