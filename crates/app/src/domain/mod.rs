//! Plaza Domain Concerns

pub mod carts;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod sellers;
pub mod users;

mod grouping;
