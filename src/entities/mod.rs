//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod product_record;

// Re-export specific types so the rest of the crate speaks in domain names
pub use product_record::{
    Column as ProductRecordColumn, Entity as ProductRecordEntity, Model as ProductRecord,
};
