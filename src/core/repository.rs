//! Product repository - the storage boundary of the pipeline.
//!
//! The pipeline only ever talks to [`ProductStore`]. [`ProductRepository`] is the
//! `SeaORM`/`SQLite` implementation used by the application and the tests.

use crate::entities::{ProductRecord, ProductRecordColumn, ProductRecordEntity, product_record};
use crate::errors::Result;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, QueryOrder, QuerySelect, prelude::*, sea_query::OnConflict,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Store id → stockcodes previously seen for that store.
pub type StockcodeIndex = BTreeMap<String, Vec<String>>;

/// Narrow storage interface the pipeline depends on.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts `record` unless its (date, stockcode, store) key already exists.
    /// Returns `true` if a row was written. An existing row is never overwritten.
    async fn save_record(&self, record: &ProductRecord) -> Result<bool>;

    /// Distinct stockcodes grouped by store, both sorted ascending.
    async fn list_stockcodes_by_store(&self) -> Result<StockcodeIndex>;

    /// Every stored record ordered by date, store, stockcode.
    async fn list_all_records(&self) -> Result<Vec<ProductRecord>>;

    /// All snapshots of one item, oldest first.
    async fn price_history(&self, store: &str, stockcode: &str) -> Result<Vec<ProductRecord>>;
}

/// `SeaORM`-backed product store.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    #[instrument(skip(self, record), fields(store = %record.store, stockcode = %record.stockcode, date = %record.date))]
    async fn save_record(&self, record: &ProductRecord) -> Result<bool> {
        let active = product_record::ActiveModel::from(record.clone()).reset_all();

        let inserted = ProductRecordEntity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    ProductRecordColumn::Date,
                    ProductRecordColumn::Stockcode,
                    ProductRecordColumn::Store,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted == 0 {
            debug!("Record already stored for this day, keeping the first one");
        }
        Ok(inserted > 0)
    }

    async fn list_stockcodes_by_store(&self) -> Result<StockcodeIndex> {
        let pairs: Vec<(String, String)> = ProductRecordEntity::find()
            .select_only()
            .column(ProductRecordColumn::Store)
            .column(ProductRecordColumn::Stockcode)
            .distinct()
            .order_by_asc(ProductRecordColumn::Store)
            .order_by_asc(ProductRecordColumn::Stockcode)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut index = StockcodeIndex::new();
        for (store, stockcode) in pairs {
            index.entry(store).or_default().push(stockcode);
        }
        Ok(index)
    }

    async fn list_all_records(&self) -> Result<Vec<ProductRecord>> {
        ProductRecordEntity::find()
            .order_by_asc(ProductRecordColumn::Date)
            .order_by_asc(ProductRecordColumn::Store)
            .order_by_asc(ProductRecordColumn::Stockcode)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn price_history(&self, store: &str, stockcode: &str) -> Result<Vec<ProductRecord>> {
        ProductRecordEntity::find()
            .filter(ProductRecordColumn::Store.eq(store))
            .filter(ProductRecordColumn::Stockcode.eq(stockcode))
            .order_by_asc(ProductRecordColumn::Date)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
