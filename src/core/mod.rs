//! Core scraping pipeline - framework-agnostic fetch, extraction, coordination and storage.

pub mod coordinator;
pub mod export;
pub mod fetch;
pub mod repository;
pub mod retailers;
pub mod service;

pub use coordinator::Coordinator;
pub use export::{ExportMode, export_records};
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use repository::{ProductRepository, ProductStore, StockcodeIndex};
pub use retailers::{Retailer, StoreKind};
pub use service::StoreService;
