//! Inventory

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::InventoryServiceError;
pub use service::*;

pub(crate) use repository::{PgSizeStocksRepository, amount_to_db, try_get_amount, try_get_size};
