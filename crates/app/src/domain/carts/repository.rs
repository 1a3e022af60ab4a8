//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{quantity_param, try_get_amount, try_get_quantity},
    domain::{
        carts::records::{CartItemId, CartItemRecord, CartLine},
        commodities::records::CommodityId,
        users::UserId,
    },
};

const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const GET_CART_ITEM_SQL: &str = include_str!("sql/get_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");
const GET_CART_LINES_SQL: &str = include_str!("sql/get_cart_lines.sql");
const LIST_CART_LINES_SQL: &str = include_str!("sql/list_cart_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a line, or add `quantity` to the user's existing line for the commodity.
    ///
    /// Returns `None` when merging would push the line above `max_quantity`.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        commodity: CommodityId,
        quantity: u32,
        max_quantity: u32,
    ) -> Result<Option<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPSERT_CART_ITEM_SQL)
            .bind(user.into_i64())
            .bind(commodity.into_i64())
            .bind(quantity_param(quantity, "commodity_num")?)
            .bind(quantity_param(max_quantity, "commodity_num")?)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemId,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_SQL)
            .bind(item.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPDATE_CART_ITEM_SQL)
            .bind(item.into_i64())
            .bind(user.into_i64())
            .bind(quantity_param(quantity, "commodity_num")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        item: CartItemId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_i64())
            .bind(user.into_i64())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Delete the user's lines among `items`, returning how many went.
    ///
    /// Rows already locked by another transaction are waited on; rows that transaction
    /// deleted are not counted.
    pub(crate) async fn delete_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        items: &[CartItemId],
    ) -> Result<u64, sqlx::Error> {
        let ids: Vec<i64> = items.iter().map(|id| id.into_i64()).collect();

        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(user.into_i64())
            .bind(ids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Lines for `items`, whoever owns them. Unknown ids are skipped.
    pub(crate) async fn get_cart_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[CartItemId],
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        let ids: Vec<i64> = items.iter().map(|id| id.into_i64()).collect();

        query_as::<Postgres, CartLine>(GET_CART_LINES_SQL)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_cart_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Postgres, CartLine>(LIST_CART_LINES_SQL)
            .bind(user.into_i64())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: CartItemId::from_i64(row.try_get("id")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            commodity_id: CommodityId::from_i64(row.try_get("commodity_id")?),
            commodity_num: try_get_quantity(row, "commodity_num")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            cart_item_id: CartItemId::from_i64(row.try_get("cart_item_id")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            commodity_id: CommodityId::from_i64(row.try_get("commodity_id")?),
            commodity_num: try_get_quantity(row, "commodity_num")?,
            commodity_name: row.try_get("commodity_name")?,
            commodity_img: row.try_get("commodity_img")?,
            commodity_selling_price: try_get_amount(row, "commodity_selling_price")?,
        })
    }
}
