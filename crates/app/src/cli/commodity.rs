use clap::{Args, Subcommand};
use emporium_app::domain::{
    commodities::{
        data::{CommodityFilter, NewCategory, NewCommodity},
        records::{CategoryId, CommodityId, SellStatus},
    },
    pagination::Pagination,
};

use super::{ServiceArgs, print_json};

#[derive(Debug, Args)]
pub(crate) struct CommodityCommand {
    #[command(subcommand)]
    command: CommoditySubcommand,
}

#[derive(Debug, Subcommand)]
enum CommoditySubcommand {
    /// Add a commodity to the catalogue
    Create(CreateCommodityArgs),

    /// Show one commodity
    Show(ShowCommodityArgs),

    /// Search the catalogue by name and category
    List(ListCommoditiesArgs),

    /// Add a category to the catalogue tree
    CreateCategory(CreateCategoryArgs),

    /// List the top-level categories, or the children of one
    Categories(ListCategoriesArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CreateCommodityArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Cover image path or URL
    #[arg(long, default_value = "")]
    cover_img: String,

    /// Category the commodity is listed under
    #[arg(long, default_value_t = 0)]
    category_id: i64,

    /// Selling price in minor units
    #[arg(long)]
    price: u64,

    /// Units in stock
    #[arg(long)]
    stock: u32,

    /// List the commodity as off sale
    #[arg(long)]
    off_sale: bool,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ShowCommodityArgs {
    /// Commodity id
    #[arg(long)]
    id: i64,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ListCommoditiesArgs {
    /// Only commodities whose name contains this text
    #[arg(long)]
    keyword: Option<String>,

    /// Only commodities in this category or below it
    #[arg(long)]
    category_id: Option<i64>,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = Pagination::DEFAULT_PAGE_SIZE)]
    page_size: u32,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct CreateCategoryArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Parent category; omit for a top-level category
    #[arg(long)]
    parent_id: Option<i64>,

    /// Higher ranks are listed first
    #[arg(long, default_value_t = 0)]
    rank: i32,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Debug, Args)]
pub(crate) struct ListCategoriesArgs {
    /// Parent category; omit for the top level
    #[arg(long)]
    parent_id: Option<i64>,

    #[command(flatten)]
    services: ServiceArgs,
}

pub(crate) async fn run(command: CommodityCommand) -> Result<(), String> {
    match command.command {
        CommoditySubcommand::Create(args) => create(args).await,
        CommoditySubcommand::Show(args) => show(args).await,
        CommoditySubcommand::List(args) => list(args).await,
        CommoditySubcommand::CreateCategory(args) => create_category(args).await,
        CommoditySubcommand::Categories(args) => categories(args).await,
    }
}

async fn create(args: CreateCommodityArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let commodity = ctx
        .commodities
        .create_commodity(NewCommodity {
            name: args.name,
            cover_img: args.cover_img,
            category_id: args.category_id,
            selling_price: args.price,
            stock_num: args.stock,
            sell_status: if args.off_sale {
                SellStatus::OffSale
            } else {
                SellStatus::OnSale
            },
        })
        .await
        .map_err(|error| format!("failed to create commodity: {error}"))?;

    print_json(&commodity)
}

async fn show(args: ShowCommodityArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let commodity = ctx
        .commodities
        .get_commodity(CommodityId::from_i64(args.id))
        .await
        .map_err(|error| format!("failed to fetch commodity: {error}"))?;

    print_json(&commodity)
}

async fn list(args: ListCommoditiesArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let page = ctx
        .commodities
        .list_commodities(
            CommodityFilter {
                keyword: args.keyword,
                category_id: args.category_id.map(CategoryId::from_i64),
            },
            Pagination::new(args.page, args.page_size),
        )
        .await
        .map_err(|error| format!("failed to list commodities: {error}"))?;

    print_json(&page)
}

async fn create_category(args: CreateCategoryArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let category = ctx
        .commodities
        .create_category(NewCategory {
            parent_id: args.parent_id.map(CategoryId::from_i64),
            name: args.name,
            rank: args.rank,
        })
        .await
        .map_err(|error| format!("failed to create category: {error}"))?;

    print_json(&category)
}

async fn categories(args: ListCategoriesArgs) -> Result<(), String> {
    let ctx = args.services.context().await?;

    let categories = ctx
        .commodities
        .list_categories(args.parent_id.map(CategoryId::from_i64))
        .await
        .map_err(|error| format!("failed to list categories: {error}"))?;

    print_json(&categories)
}
