//! Payments

pub mod errors;
pub mod gateway;
pub mod service;

pub use errors::PaymentsServiceError;
pub use gateway::*;
pub use service::*;
