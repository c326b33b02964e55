//! Store service - the shared fetch → extract → map driver.
//!
//! One [`StoreService`] wraps one [`Retailer`]. The driver is written once against
//! the retailer trait, so the only per-store code is URL shape, payload location
//! and field projection.
//!
//! Failure handling is layered:
//! - a blank stockcode is rejected with [`Error::InvalidStockcode`] before any
//!   request is made;
//! - transport errors, unexpected statuses and a second redirect are logged and
//!   become "no page" (`None`) in [`StoreService::fetch_product`];
//! - a missing page, marker or field becomes [`Error::ProductNotFound`] in
//!   [`StoreService::get_by_stockcode`];
//! - [`StoreService::get_by_stockcodes`] stops at the first not-found item.

use crate::core::fetch::PageFetcher;
use crate::core::retailers::Retailer;
use crate::entities::ProductRecord;
use crate::errors::{Error, Result};
use reqwest::Url;
use sea_orm::prelude::Date;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How many 308 redirects a single top-level fetch may follow.
pub const MAX_REDIRECTS: u8 = 1;

const PERMANENT_REDIRECT: u16 = 308;

/// Scrapes one retailer.
pub struct StoreService {
    retailer: Box<dyn Retailer>,
    fetcher: Arc<dyn PageFetcher>,
}

impl StoreService {
    #[must_use]
    pub fn new(retailer: Box<dyn Retailer>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { retailer, fetcher }
    }

    #[must_use]
    pub fn store_id(&self) -> &str {
        self.retailer.id()
    }

    /// Downloads the product page for `stockcode`, following at most
    /// [`MAX_REDIRECTS`] permanent redirects.
    pub async fn fetch_product(&self, stockcode: &str) -> Option<String> {
        let Some(url) = self.retailer.build_url(stockcode) else {
            warn!(
                store = self.store_id(),
                "Cannot build a product URL from {}",
                self.retailer.base_url()
            );
            return None;
        };
        self.fetch_url(&url, MAX_REDIRECTS).await
    }

    /// GETs `url`, following a 308 while `redirects_remaining` allows.
    ///
    /// The allowance belongs to this call alone, so a redirect taken here never
    /// affects a later fetch.
    pub async fn fetch_url(&self, url: &str, mut redirects_remaining: u8) -> Option<String> {
        let mut url = url.to_string();

        loop {
            let page = match self.fetcher.get(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(store = self.store_id(), "Request to {} failed: {}", url, e);
                    return None;
                }
            };

            match page.status {
                200 => return Some(page.body),
                PERMANENT_REDIRECT if redirects_remaining > 0 => {
                    let Some(next) = page
                        .location
                        .as_deref()
                        .and_then(|location| resolve_location(&url, location))
                    else {
                        warn!(
                            store = self.store_id(),
                            "Redirect from {} has no usable Location header", url
                        );
                        return None;
                    };
                    debug!(store = self.store_id(), "Following redirect {} -> {}", url, next);
                    redirects_remaining -= 1;
                    url = next;
                }
                status => {
                    warn!(
                        store = self.store_id(),
                        "Request to {} returned HTTP {}", url, status
                    );
                    return None;
                }
            }
        }
    }

    /// Fetches, extracts and maps a single product, dated today.
    ///
    /// # Errors
    /// Returns `Error::InvalidStockcode` for a blank stockcode and
    /// `Error::ProductNotFound` if no record could be produced.
    #[instrument(skip(self), fields(store = %self.store_id()))]
    pub async fn get_by_stockcode(&self, stockcode: &str) -> Result<ProductRecord> {
        self.get_by_stockcode_on(stockcode, today()).await
    }

    /// Same as [`Self::get_by_stockcode`] with an explicit capture date.
    ///
    /// # Errors
    /// Returns `Error::InvalidStockcode` for a blank stockcode and
    /// `Error::ProductNotFound` if no record could be produced.
    pub async fn get_by_stockcode_on(&self, stockcode: &str, date: Date) -> Result<ProductRecord> {
        if stockcode.trim().is_empty() {
            return Err(Error::InvalidStockcode {
                store: self.store_id().to_string(),
                stockcode: stockcode.to_string(),
            });
        }

        let record = match self.fetch_product(stockcode).await {
            Some(body) => self.extract_record(&body, stockcode, date),
            None => None,
        };

        record.ok_or_else(|| {
            info!(store = self.store_id(), "No product data for {}", stockcode);
            Error::ProductNotFound {
                store: self.store_id().to_string(),
                stockcode: stockcode.to_string(),
            }
        })
    }

    /// Resolves every stockcode in order, all dated today.
    ///
    /// # Errors
    /// The first stockcode that is blank or cannot be resolved aborts the batch;
    /// no partial result is returned.
    #[instrument(skip(self, stockcodes), fields(store = %self.store_id(), count = stockcodes.len()))]
    pub async fn get_by_stockcodes(&self, stockcodes: &[String]) -> Result<Vec<ProductRecord>> {
        let date = today();
        let mut records = Vec::with_capacity(stockcodes.len());

        for stockcode in stockcodes {
            let record = self
                .get_by_stockcode_on(stockcode, date)
                .await
                .inspect_err(|e| warn!("Aborting batch: {}", e))?;
            records.push(record);
        }

        info!("Fetched {} products", records.len());
        Ok(records)
    }

    fn extract_record(&self, body: &str, stockcode: &str, date: Date) -> Option<ProductRecord> {
        let Some(payload) = self.retailer.extract_payload(body) else {
            debug!(store = self.store_id(), "No embedded payload for {}", stockcode);
            return None;
        };

        match self.retailer.map_to_record(payload, stockcode, date) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(
                    store = self.store_id(),
                    "Payload for {} is missing fields: {}", stockcode, e
                );
                None
            }
        }
    }
}

fn resolve_location(base: &str, location: &str) -> Option<String> {
    Url::parse(base)
        .ok()?
        .join(location)
        .ok()
        .map(Into::into)
}

fn today() -> Date {
    chrono::Local::now().date_naive()
}
