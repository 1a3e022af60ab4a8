//! Configuration groups shared by the CLI commands.
//!
//! Each group is a `clap::Args` struct with environment fallbacks, flattened into whichever
//! command needs it.

pub mod checkout;
pub mod db;
pub mod logging;

pub use checkout::CheckoutConfig;
pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
