use clap::{Args, Subcommand};
use emporium_app::domain::{addresses::data::NewAddress, users::UserId};

use super::{ServiceArgs, print_json};

#[derive(Debug, Args)]
pub(crate) struct AddressCommand {
    #[command(subcommand)]
    command: AddressSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddressSubcommand {
    /// Save a shipping address for a user
    Create(CreateAddressArgs),

    /// List a user's shipping addresses
    List(ListAddressesArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CreateAddressArgs {
    /// Owning user id
    #[arg(long)]
    user: i64,

    /// Recipient name
    #[arg(long)]
    name: String,

    /// Recipient phone number
    #[arg(long)]
    phone: String,

    #[arg(long)]
    province: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    region: String,

    /// Street address
    #[arg(long)]
    detail: String,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ListAddressesArgs {
    /// Owning user id
    #[arg(long)]
    user: i64,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(command: AddressCommand) -> Result<(), String> {
    match command.command {
        AddressSubcommand::Create(args) => create(args).await,
        AddressSubcommand::List(args) => list(args).await,
    }
}

async fn create(args: CreateAddressArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let address = ctx
        .addresses
        .create_address(
            UserId::from_i64(args.user),
            NewAddress {
                user_name: args.name,
                user_phone: args.phone,
                province_name: args.province,
                city_name: args.city,
                region_name: args.region,
                detail_address: args.detail,
            },
        )
        .await
        .map_err(|error| format!("failed to create address: {error}"))?;

    print_json(&address)
}

async fn list(args: ListAddressesArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let addresses = ctx
        .addresses
        .list_addresses(UserId::from_i64(args.user))
        .await
        .map_err(|error| format!("failed to list addresses: {error}"))?;

    print_json(&addresses)
}
