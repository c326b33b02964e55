//! Application commands - the operations the command-line front end exposes.
//!
//! Each command wires the coordinator to the store; output formatting stays in
//! the binary.

use crate::core::{Coordinator, ExportMode, ProductStore, export_records};
use crate::entities::ProductRecord;
use crate::errors::Result;
use std::path::Path;
use tracing::{info, instrument};

/// Outcome of a full update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Records returned by the stores
    pub fetched: usize,
    /// Records that were new for today and got stored
    pub saved: usize,
}

/// Re-fetches every stockcode already known to the store and saves the results.
///
/// Nothing is saved unless every store succeeds.
#[instrument(skip_all)]
pub async fn update_products(
    coordinator: &Coordinator,
    store: &dyn ProductStore,
) -> Result<UpdateSummary> {
    let index = store.list_stockcodes_by_store().await?;
    let records = coordinator.update_all(&index).await?;

    let mut saved = 0;
    for record in &records {
        if store.save_record(record).await? {
            saved += 1;
        }
    }

    info!("Saved {} of {} fetched products", saved, records.len());
    Ok(UpdateSummary {
        fetched: records.len(),
        saved,
    })
}

/// Starts tracking a product: fetches it once and stores today's snapshot.
///
/// Returns the record and whether it was newly stored.
#[instrument(skip(coordinator, store))]
pub async fn track_product(
    coordinator: &Coordinator,
    store: &dyn ProductStore,
    store_id: &str,
    stockcode: &str,
) -> Result<(ProductRecord, bool)> {
    let record = coordinator.get_one(stockcode, store_id).await?;
    let saved = store.save_record(&record).await?;
    Ok((record, saved))
}

/// Exports every stored record to a CSV file.
pub async fn export_all(store: &dyn ProductStore, path: &Path, mode: ExportMode) -> Result<usize> {
    let records = store.list_all_records().await?;
    export_records(&records, path, mode)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::FetchedPage;
    use crate::errors::Error;
    use crate::test_utils::{
        sample_record, setup_test_repository, test_coordinator, test_date, woolworths_page,
    };

    #[tokio::test]
    async fn test_update_products_saves_new_snapshots() -> Result<()> {
        let repo = setup_test_repository().await?;
        repo.save_record(&sample_record("storeA", "1", test_date(), 1.0))
            .await?;
        repo.save_record(&sample_record("storeB", "2", test_date(), 2.0))
            .await?;

        let (coordinator, fetcher) = test_coordinator(&["storeA", "storeB"]);
        fetcher.respond("https://storea.test/product/1", FetchedPage::ok(woolworths_page("One", 1.5)));
        fetcher.respond("https://storeb.test/product/2", FetchedPage::ok(woolworths_page("Two", 2.5)));

        let summary = update_products(&coordinator, &repo).await?;
        assert_eq!(summary, UpdateSummary { fetched: 2, saved: 2 });

        // Second run on the same day is a no-op for storage
        let summary = update_products(&coordinator, &repo).await?;
        assert_eq!(summary, UpdateSummary { fetched: 2, saved: 0 });
        assert_eq!(repo.list_all_records().await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_products_saves_nothing_on_failure() -> Result<()> {
        let repo = setup_test_repository().await?;
        repo.save_record(&sample_record("storeA", "1", test_date(), 1.0))
            .await?;
        repo.save_record(&sample_record("storeB", "2", test_date(), 2.0))
            .await?;

        let (coordinator, fetcher) = test_coordinator(&["storeA", "storeB"]);
        fetcher.respond("https://storea.test/product/1", FetchedPage::ok(woolworths_page("One", 1.5)));

        let err = update_products(&coordinator, &repo).await.unwrap_err();
        assert!(matches!(err, Error::ProductNotFound { .. }));
        assert_eq!(repo.list_all_records().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_track_product() -> Result<()> {
        let repo = setup_test_repository().await?;
        let (coordinator, fetcher) = test_coordinator(&["storeA"]);
        fetcher.respond("https://storea.test/product/55", FetchedPage::ok(woolworths_page("Rice", 2.0)));

        let (record, saved) = track_product(&coordinator, &repo, "storeA", "55").await?;
        assert!(saved);
        assert_eq!(record.product_name, "Rice");

        let index = repo.list_stockcodes_by_store().await?;
        assert_eq!(index.get("storeA"), Some(&vec!["55".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_export_all() -> Result<()> {
        let repo = setup_test_repository().await?;
        repo.save_record(&sample_record("storeA", "1", test_date(), 1.0))
            .await?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("all.csv");

        assert_eq!(export_all(&repo, &path, ExportMode::Overwrite).await?, 1);
        assert_eq!(std::fs::read_to_string(&path)?.lines().count(), 2);
        Ok(())
    }
}
