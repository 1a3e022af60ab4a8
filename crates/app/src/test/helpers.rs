//! Test Helpers

use crate::{
    domain::{
        addresses::{
            AddressesService, AddressesServiceError, data::NewAddress, records::AddressRecord,
        },
        carts::{
            CartsService, CartsServiceError,
            data::NewCartItem,
            records::{CartItemId, CartItemRecord},
        },
        commodities::{
            CommoditiesService, CommoditiesServiceError,
            data::NewCommodity,
            records::{CommodityId, CommodityRecord, SellStatus},
        },
        users::UserId,
    },
    test::TestContext,
};

pub(crate) fn new_commodity(name: &str, selling_price: u64, stock_num: u32) -> NewCommodity {
    NewCommodity {
        name: name.to_string(),
        cover_img: format!("/img/{}.png", name.to_lowercase()),
        category_id: 1,
        selling_price,
        stock_num,
        sell_status: SellStatus::OnSale,
    }
}

pub(crate) fn new_address(user_name: &str) -> NewAddress {
    NewAddress {
        user_name: user_name.to_string(),
        user_phone: "13800000000".to_string(),
        province_name: "Zhejiang".to_string(),
        city_name: "Hangzhou".to_string(),
        region_name: "Xihu".to_string(),
        detail_address: "1 Lakeside Road".to_string(),
    }
}

pub(crate) async fn create_commodity(
    ctx: &TestContext,
    name: &str,
    selling_price: u64,
    stock_num: u32,
) -> Result<CommodityRecord, CommoditiesServiceError> {
    ctx.commodities
        .create_commodity(new_commodity(name, selling_price, stock_num))
        .await
}

pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    user: UserId,
    commodity_id: CommodityId,
    quantity: u32,
) -> Result<CartItemRecord, CartsServiceError> {
    ctx.carts
        .add_item(
            user,
            NewCartItem {
                commodity_id,
                quantity,
            },
        )
        .await
}

pub(crate) async fn create_address(
    ctx: &TestContext,
    user: UserId,
) -> Result<AddressRecord, AddressesServiceError> {
    ctx.addresses
        .create_address(user, new_address("Ada"))
        .await
}

/// Ids of every line in `user`'s cart, ascending.
pub(crate) async fn cart_item_ids(
    ctx: &TestContext,
    user: UserId,
) -> Result<Vec<CartItemId>, CartsServiceError> {
    let mut ids: Vec<_> = ctx
        .carts
        .list_items(user)
        .await?
        .into_iter()
        .map(|line| line.cart_item_id)
        .collect();

    ids.sort_unstable();

    Ok(ids)
}

/// Current stock of a commodity, read straight from the table.
pub(crate) async fn stock_of(ctx: &TestContext, commodity: CommodityId) -> u32 {
    let stock: i32 = sqlx::query_scalar("SELECT stock_num FROM commodities WHERE id = $1")
        .bind(commodity.into_i64())
        .fetch_one(ctx.db.pool())
        .await
        .expect("Failed to read stock");

    u32::try_from(stock).expect("stock is never negative")
}
