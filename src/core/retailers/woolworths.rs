//! Woolworths product pages.
//!
//! The page embeds a product-details JSON document whose top-level `Product`
//! object already uses the field names the record is modelled on.

use super::{Retailer, StoreKind};
use crate::entities::ProductRecord;
use sea_orm::prelude::Date;
use serde::Deserialize;
use serde_json::Value;

pub const BASE_URL: &str = "https://www.woolworths.com.au/shop/productdetails";
pub const MARKER: &str = r#"<script id="wx-product-details" type="application/json">"#;

/// Woolworths retailer
#[derive(Debug, Clone)]
pub struct Woolworths {
    base_url: String,
    marker: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Payload {
    product: ProductDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProductDetails {
    name: String,
    price: f64,
    // Optional fields may be absent or published as null
    #[serde(default)]
    is_on_special: Option<bool>,
    #[serde(default)]
    is_half_price: Option<bool>,
    #[serde(default)]
    was_price: Option<f64>,
    #[serde(default)]
    savings_amount: Option<f64>,
    #[serde(default)]
    package_size: Option<String>,
    #[serde(default)]
    unit_weight_in_grams: Option<f64>,
    #[serde(default)]
    cup_price: Option<f64>,
    #[serde(default)]
    cup_measure: Option<String>,
    #[serde(default)]
    cup_string: Option<String>,
}

impl Woolworths {
    #[must_use]
    pub fn new(base_url: String, marker: String) -> Self {
        Self { base_url, marker }
    }
}

impl Default for Woolworths {
    fn default() -> Self {
        Self::new(BASE_URL.to_string(), MARKER.to_string())
    }
}

impl Retailer for Woolworths {
    fn id(&self) -> &str {
        StoreKind::Woolworths.as_str()
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
        let Payload { product } = serde_json::from_value(payload)?;

        Ok(ProductRecord {
            date,
            stockcode: stockcode.to_string(),
            store: self.id().to_string(),
            product_name: product.name.trim().to_string(),
            price: product.price,
            is_on_special: product.is_on_special.unwrap_or_default(),
            is_half_price: product.is_half_price.unwrap_or_default(),
            was_price: product.was_price.unwrap_or_default(),
            savings_amount: product.savings_amount.unwrap_or_default(),
            package_size: product
                .package_size
                .unwrap_or_default()
                .trim()
                .to_uppercase(),
            unit_weight_in_grams: product.unit_weight_in_grams.unwrap_or_default(),
            cup_price: product.cup_price,
            cup_measure: product.cup_measure,
            cup_string: product.cup_string,
        })
    }
}
