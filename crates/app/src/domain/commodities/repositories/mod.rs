//! Commodity Repositories

mod categories;
mod commodities;
mod stock;

pub(crate) use categories::PgCategoriesRepository;
pub(crate) use commodities::PgCommoditiesRepository;
pub(crate) use stock::PgStockRepository;
