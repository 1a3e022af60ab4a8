use clap::{Args, Subcommand};
use emporium_app::domain::{
    carts::{data::NewCartItem, records::CartItemId},
    commodities::records::CommodityId,
    users::UserId,
};

use super::{ServiceArgs, print_json};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Put units of a commodity in a user's cart
    Add(AddItemArgs),

    /// Set the quantity of a cart line
    Update(UpdateItemArgs),

    /// Remove a cart line
    Remove(RemoveItemArgs),

    /// Show a user's cart
    List(ListItemsArgs),

    /// Preview the bill for selected cart lines
    Bill(BillArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AddItemArgs {
    #[arg(long)]
    user: i64,

    #[arg(long)]
    commodity: i64,

    #[arg(long, default_value_t = 1)]
    quantity: u32,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateItemArgs {
    #[arg(long)]
    user: i64,

    /// Cart line id
    #[arg(long)]
    item: i64,

    #[arg(long)]
    quantity: u32,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveItemArgs {
    #[arg(long)]
    user: i64,

    /// Cart line id
    #[arg(long)]
    item: i64,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ListItemsArgs {
    #[arg(long)]
    user: i64,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct BillArgs {
    #[arg(long)]
    user: i64,

    /// Cart line ids to bill, comma separated
    #[arg(long = "items", value_delimiter = ',', required = true)]
    items: Vec<i64>,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Add(args) => add(args).await,
        CartSubcommand::Update(args) => update(args).await,
        CartSubcommand::Remove(args) => remove(args).await,
        CartSubcommand::List(args) => list(args).await,
        CartSubcommand::Bill(args) => bill(args).await,
    }
}

async fn add(args: AddItemArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let item = ctx
        .carts
        .add_item(
            UserId::from_i64(args.user),
            NewCartItem {
                commodity_id: CommodityId::from_i64(args.commodity),
                quantity: args.quantity,
            },
        )
        .await
        .map_err(|error| format!("failed to add to cart: {error}"))?;

    print_json(&item)
}

async fn update(args: UpdateItemArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let item = ctx
        .carts
        .update_item(
            UserId::from_i64(args.user),
            CartItemId::from_i64(args.item),
            args.quantity,
        )
        .await
        .map_err(|error| format!("failed to update cart line: {error}"))?;

    print_json(&item)
}

async fn remove(args: RemoveItemArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    ctx.carts
        .remove_item(UserId::from_i64(args.user), CartItemId::from_i64(args.item))
        .await
        .map_err(|error| format!("failed to remove cart line: {error}"))?;

    println!("removed cart line {}", args.item);

    Ok(())
}

async fn list(args: ListItemsArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let lines = ctx
        .carts
        .list_items(UserId::from_i64(args.user))
        .await
        .map_err(|error| format!("failed to list cart: {error}"))?;

    print_json(&lines)
}

async fn bill(args: BillArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let bill = ctx
        .carts
        .check_bill(
            UserId::from_i64(args.user),
            args.items.into_iter().map(CartItemId::from_i64).collect(),
        )
        .await
        .map_err(|error| format!("failed to compute bill: {error}"))?;

    print_json(&bill)
}
