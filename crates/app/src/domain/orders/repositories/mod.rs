//! Order Repositories

mod addresses;
mod items;
mod orders;

pub(crate) use addresses::PgOrderAddressesRepository;
pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::PgOrdersRepository;
