//! Coles product pages.
//!
//! Coles serves a Next.js page; the product sits under `props.pageProps.product`
//! in the `__NEXT_DATA__` script. Bare `/product/{stockcode}` URLs answer with a
//! 308 to the canonical slugged URL, which the service follows once.

use super::{Retailer, StoreKind};
use crate::entities::ProductRecord;
use sea_orm::prelude::Date;
use serde::Deserialize;
use serde_json::Value;

pub const BASE_URL: &str = "https://www.coles.com.au/product";
pub const MARKER: &str = r#"<script id="__NEXT_DATA__" type="application/json">"#;

const HALF_PRICE: &str = "HALF_PRICE";

/// Coles retailer
#[derive(Debug, Clone)]
pub struct Coles {
    base_url: String,
    marker: String,
}

#[derive(Debug, Deserialize)]
struct NextData {
    props: Props,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Props {
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    product: ProductDetails,
}

#[derive(Debug, Deserialize)]
struct ProductDetails {
    name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    size: Option<String>,
    pricing: Pricing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pricing {
    now: f64,
    #[serde(default)]
    was: Option<f64>,
    #[serde(default)]
    save_amount: Option<f64>,
    #[serde(default)]
    promotion_type: Option<String>,
    #[serde(default)]
    special_type: Option<String>,
    #[serde(default)]
    comparable: Option<String>,
    #[serde(default)]
    unit: Option<UnitPricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitPricing {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    of_measure_units: Option<String>,
}

impl Coles {
    #[must_use]
    pub fn new(base_url: String, marker: String) -> Self {
        Self { base_url, marker }
    }
}

impl Default for Coles {
    fn default() -> Self {
        Self::new(BASE_URL.to_string(), MARKER.to_string())
    }
}

impl Retailer for Coles {
    fn id(&self) -> &str {
        StoreKind::Coles.as_str()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn marker(&self) -> &str {
        &self.marker
    }

    fn map_to_record(
        &self,
        payload: Value,
        stockcode: &str,
        date: Date,
    ) -> serde_json::Result<ProductRecord> {
        let NextData { props } = serde_json::from_value(payload)?;
        let ProductDetails {
            name,
            brand,
            size,
            pricing,
        } = props.page_props.product;

        let product_name = match brand.as_deref().map(str::trim) {
            Some(brand) if !brand.is_empty() => format!("{brand} {}", name.trim()),
            _ => name.trim().to_string(),
        };
        let package_size = size.unwrap_or_default().trim().to_uppercase();
        let was = pricing.was.unwrap_or_default();
        let is_half_price = pricing.special_type.as_deref() == Some(HALF_PRICE);
        let is_on_special = is_half_price
            || pricing
                .promotion_type
                .as_deref()
                .is_some_and(|p| !p.is_empty())
            || was > pricing.now;
        let savings_amount = pricing
            .save_amount
            .unwrap_or_else(|| (was - pricing.now).max(0.0));
        let (cup_price, cup_measure) = pricing
            .unit
            .map_or((None, None), |unit| (unit.price, unit.of_measure_units));

        Ok(ProductRecord {
            date,
            stockcode: stockcode.to_string(),
            store: self.id().to_string(),
            product_name,
            price: pricing.now,
            is_on_special,
            is_half_price,
            was_price: was,
            savings_amount,
            unit_weight_in_grams: grams_from_size(&package_size),
            package_size,
            cup_price,
            cup_measure,
            cup_string: pricing.comparable,
        })
    }
}

/// Weight in grams for sizes given in G or KG ("500G", "1.5KG"); 0 otherwise.
fn grams_from_size(size: &str) -> f64 {
    if let Some(kg) = size.strip_suffix("KG") {
        return kg.trim().parse::<f64>().map_or(0.0, |v| v * 1000.0);
    }
    if let Some(g) = size.strip_suffix('G') {
        return g.trim().parse::<f64>().unwrap_or(0.0);
    }
    0.0
}
