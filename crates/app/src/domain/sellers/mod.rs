//! Sellers

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::SellersServiceError;
pub use service::*;

pub(crate) use repository::PgSellersRepository;
