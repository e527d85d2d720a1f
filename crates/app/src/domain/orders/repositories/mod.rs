//! Order repositories.

mod items;
mod orders;
mod shipments;

pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::PgOrdersRepository;
pub(crate) use shipments::PgShipmentsRepository;
