use clap::{Args, Parser, Subcommand};
use emporium_app::{
    config::{CheckoutConfig, DatabaseConfig, LoggingConfig},
    context::AppContext,
};
use serde::Serialize;

mod address;
mod cart;
mod commodity;
mod db;
mod order;

#[derive(Debug, Parser)]
#[command(name = "emporium-app", about = "Emporium store CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Commodity(commodity::CommodityCommand),
    Address(address::AddressCommand),
    Cart(cart::CartCommand),
    Order(order::OrderCommand),
}

impl Cli {
    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Commodity(command) => commodity::run(command).await,
            Commands::Address(command) => address::run(command).await,
            Commands::Cart(command) => cart::run(command).await,
            Commands::Order(command) => order::run(command).await,
        }
    }
}

/// Settings every service-backed command needs.
#[derive(Debug, Args)]
pub(crate) struct ServiceArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    checkout: CheckoutConfig,
}

impl ServiceArgs {
    pub(crate) async fn context(&self) -> Result<AppContext, String> {
        AppContext::from_config(&self.database, &self.checkout)
            .await
            .map_err(|error| format!("failed to initialise services: {error}"))
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}
