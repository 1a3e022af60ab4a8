//! Commodities

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::CommoditiesServiceError;
pub use service::*;
