//! Retailer definitions - the per-store half of the scraping pipeline.
//!
//! A [`Retailer`] knows three things about one store: where a product page lives,
//! where the structured data sits inside that page, and how that data maps onto a
//! [`ProductRecord`]. Everything else (HTTP, redirects, batching) is shared and
//! lives in [`crate::core::service`].

use crate::entities::ProductRecord;
use crate::errors::{Error, Result};
use sea_orm::prelude::Date;
use reqwest::Url;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

pub mod coles;
pub mod woolworths;

pub use coles::Coles;
pub use woolworths::Woolworths;

/// Capability set a store must provide to be scraped.
pub trait Retailer: Send + Sync {
    /// Store identifier written into every record.
    fn id(&self) -> &str;

    /// Product URL prefix; the stockcode is appended as the last path segment.
    fn base_url(&self) -> &str;

    /// Script-tag marker the embedded JSON payload follows.
    fn marker(&self) -> &str;

    /// Product page URL for `stockcode`, percent-encoded as one path segment.
    ///
    /// Returns `None` if the base URL cannot carry a path.
    fn build_url(&self, stockcode: &str) -> Option<String> {
        let mut url = Url::parse(self.base_url()).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(stockcode);
        Some(url.into())
    }

    /// Pulls the embedded JSON out of a product page. `None` is an expected miss.
    fn extract_payload(&self, body: &str) -> Option<Value> {
        extract_embedded_json(body, self.marker())
    }

    /// Projects the store-specific payload onto the canonical record.
    ///
    /// # Errors
    /// Returns the deserialization error if the payload lacks the fields this
    /// store needs.
    fn map_to_record(
        &self,
        payload: Value,
        stockcode: &str,
        date: Date,
    ) -> serde_json::Result<ProductRecord>;
}

/// Finds `marker` in `body` and decodes everything up to the next `</script>` as JSON.
///
/// Returns `None` when the marker or the closing tag is absent, or when the
/// enclosed text is not valid JSON.
#[must_use]
pub fn extract_embedded_json(body: &str, marker: &str) -> Option<Value> {
    let start = body.find(marker)? + marker.len();
    let rest = &body[start..];
    let end = rest.find("</script>")?;

    match serde_json::from_str(rest[..end].trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Embedded JSON after marker is malformed: {}", e);
            None
        }
    }
}

/// The retailers this crate knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Woolworths,
    Coles,
}

impl StoreKind {
    /// Every supported store, in default registration order.
    pub const ALL: [Self; 2] = [Self::Woolworths, Self::Coles];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Woolworths => "woolworths",
            Self::Coles => "coles",
        }
    }

    /// Creates the retailer, optionally overriding its URL prefix and marker.
    #[must_use]
    pub fn build(self, base_url: Option<String>, marker: Option<String>) -> Box<dyn Retailer> {
        match self {
            Self::Woolworths => {
                let defaults = Woolworths::default();
                Box::new(Woolworths::new(
                    base_url.unwrap_or_else(|| defaults.base_url().to_string()),
                    marker.unwrap_or_else(|| defaults.marker().to_string()),
                ))
            }
            Self::Coles => {
                let defaults = Coles::default();
                Box::new(Coles::new(
                    base_url.unwrap_or_else(|| defaults.base_url().to_string()),
                    marker.unwrap_or_else(|| defaults.marker().to_string()),
                ))
            }
        }
    }
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedStore {
                store: s.to_string(),
            })
    }
}
