//! Order Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{amount_param, quantity_param, try_get_amount, try_get_quantity},
    domain::{
        commodities::records::CommodityId,
        orders::{
            data::NewOrderItem,
            records::{OrderId, OrderItemRecord},
        },
    },
};

const CREATE_ORDER_ITEMS_SQL: &str = include_str!("../sql/create_order_items.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        let mut commodity_ids = Vec::with_capacity(items.len());
        let mut names = Vec::with_capacity(items.len());
        let mut images = Vec::with_capacity(items.len());
        let mut prices = Vec::with_capacity(items.len());
        let mut quantities = Vec::with_capacity(items.len());

        for item in items {
            commodity_ids.push(item.commodity_id.into_i64());
            names.push(item.commodity_name.as_str());
            images.push(item.commodity_img.as_str());
            prices.push(amount_param(
                item.commodity_selling_price,
                "commodity_selling_price",
            )?);
            quantities.push(quantity_param(item.commodity_num, "commodity_num")?);
        }

        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEMS_SQL)
            .bind(order.into_i64())
            .bind(commodity_ids)
            .bind(names)
            .bind(images)
            .bind(prices)
            .bind(quantities)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderId],
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        let ids: Vec<i64> = orders.iter().map(|id| id.into_i64()).collect();

        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            commodity_id: CommodityId::from_i64(row.try_get("commodity_id")?),
            commodity_name: row.try_get("commodity_name")?,
            commodity_img: row.try_get("commodity_img")?,
            commodity_selling_price: try_get_amount(row, "commodity_selling_price")?,
            commodity_num: try_get_quantity(row, "commodity_num")?,
        })
    }
}
