//! Emporium Domain Concerns

pub mod addresses;
pub mod carts;
pub mod commodities;
pub mod orders;
pub mod pagination;
pub mod users;
