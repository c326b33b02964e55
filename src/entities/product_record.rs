//! Product record entity - One retailer's price snapshot for one item on one day.
//!
//! Records are keyed by (date, stockcode, store). The composite primary key is what
//! makes a same-day re-fetch a no-op: the first write wins and later inserts with
//! the same key are discarded. Records are never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_records")]
pub struct Model {
    /// Day the price was captured
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,
    /// Retailer-assigned item identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub stockcode: String,
    /// Store identifier (e.g., "woolworths")
    #[sea_orm(primary_key, auto_increment = false)]
    pub store: String,
    /// Display name as shown by the retailer
    pub product_name: String,
    /// Current shelf price in dollars
    pub price: f64,
    pub is_on_special: bool,
    pub is_half_price: bool,
    /// Prior price, 0 when the item is not discounted
    pub was_price: f64,
    pub savings_amount: f64,
    /// Package size, upper-cased (e.g., "2L", "500G")
    pub package_size: String,
    pub unit_weight_in_grams: f64,
    /// Per-unit price, absent for items without comparable pricing
    pub cup_price: Option<f64>,
    /// Unit the per-unit price refers to (e.g., "1L")
    pub cup_measure: Option<String>,
    /// Retailer's per-unit display string (e.g., "$2.25 / 1L")
    pub cup_string: Option<String>,
}

/// Product records stand alone and have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
