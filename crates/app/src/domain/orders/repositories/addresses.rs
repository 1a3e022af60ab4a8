//! Order Addresses Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::orders::{
    data::NewOrderAddress,
    records::{OrderAddressRecord, OrderId},
};

const CREATE_ORDER_ADDRESS_SQL: &str = include_str!("../sql/create_order_address.sql");
const GET_ORDER_ADDRESSES_SQL: &str = include_str!("../sql/get_order_addresses.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderAddressesRepository;

impl PgOrderAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        address: &NewOrderAddress,
    ) -> Result<OrderAddressRecord, sqlx::Error> {
        query_as::<Postgres, OrderAddressRecord>(CREATE_ORDER_ADDRESS_SQL)
            .bind(order.into_i64())
            .bind(&address.user_name)
            .bind(&address.user_phone)
            .bind(&address.province_name)
            .bind(&address.city_name)
            .bind(&address.region_name)
            .bind(&address.detail_address)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderId],
    ) -> Result<Vec<OrderAddressRecord>, sqlx::Error> {
        let ids: Vec<i64> = orders.iter().map(|id| id.into_i64()).collect();

        query_as::<Postgres, OrderAddressRecord>(GET_ORDER_ADDRESSES_SQL)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderAddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            user_name: row.try_get("user_name")?,
            user_phone: row.try_get("user_phone")?,
            province_name: row.try_get("province_name")?,
            city_name: row.try_get("city_name")?,
            region_name: row.try_get("region_name")?,
            detail_address: row.try_get("detail_address")?,
        })
    }
}
