use clap::{Args, Subcommand};
use emporium_app::domain::{
    addresses::records::AddressId,
    carts::records::CartItemId,
    orders::records::OrderNo,
    pagination::Pagination,
    users::UserId,
};

use super::{ServiceArgs, print_json};

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Check out selected cart lines
    Create(CreateOrderArgs),

    /// Cancel an unpaid order and return its stock
    Cancel(OrderNoArgs),

    /// Show one order with its lines and address
    Show(OrderNoArgs),

    /// List a user's orders, newest first
    List(ListOrdersArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CreateOrderArgs {
    #[arg(long)]
    user: i64,

    /// Cart line ids to buy, comma separated
    #[arg(long = "items", value_delimiter = ',', required = true)]
    items: Vec<i64>,

    /// Shipping address id
    #[arg(long)]
    address: i64,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct OrderNoArgs {
    #[arg(long)]
    user: i64,

    #[arg(long)]
    order_no: String,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    #[arg(long)]
    user: i64,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = Pagination::DEFAULT_PAGE_SIZE)]
    page_size: u32,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Create(args) => create(args).await,
        OrderSubcommand::Cancel(args) => cancel(args).await,
        OrderSubcommand::Show(args) => show(args).await,
        OrderSubcommand::List(args) => list(args).await,
    }
}

async fn create(args: CreateOrderArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let order = ctx
        .orders
        .create_order(
            UserId::from_i64(args.user),
            args.items.into_iter().map(CartItemId::from_i64).collect(),
            AddressId::from_i64(args.address),
        )
        .await
        .map_err(|error| format!("failed to create order ({}): {error}", error.class()))?;

    print_json(&order)
}

async fn cancel(args: OrderNoArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    ctx.orders
        .cancel_order(UserId::from_i64(args.user), OrderNo::new(args.order_no.clone()))
        .await
        .map_err(|error| format!("failed to cancel order ({}): {error}", error.class()))?;

    println!("cancelled order {}", args.order_no);

    Ok(())
}

async fn show(args: OrderNoArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let order = ctx
        .orders
        .get_order(UserId::from_i64(args.user), OrderNo::new(args.order_no))
        .await
        .map_err(|error| format!("failed to fetch order: {error}"))?;

    print_json(&order)
}

async fn list(args: ListOrdersArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let page = ctx
        .orders
        .list_orders(
            UserId::from_i64(args.user),
            Pagination::new(args.page, args.page_size),
        )
        .await
        .map_err(|error| format!("failed to list orders: {error}"))?;

    print_json(&page)
}
