//! Orders
//!
//! Checkout turns a selection of cart lines into an order in one transaction: bill, order rows,
//! cart removal and stock debit commit together or not at all. Cancellation flips the status in
//! one transaction and credits stock back in another.

pub mod data;
pub mod errors;
pub mod order_no;
pub mod records;
mod repositories;
pub mod service;

pub use errors::{ErrorClass, OrdersServiceError};
pub use service::*;
