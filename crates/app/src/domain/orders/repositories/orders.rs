//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{amount_param, try_get_amount},
    domain::{
        orders::{
            data::NewOrder,
            records::{OrderId, OrderNo, OrderRecord, OrderStatus, PayState},
        },
        pagination::Pagination,
        users::UserId,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_BY_NO_SQL: &str = include_str!("../sql/get_order_by_no.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("../sql/list_user_orders.sql");
const COUNT_USER_ORDERS_SQL: &str = include_str!("../sql/count_user_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert an unpaid order in `Created` status. Items and address are attached separately.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.order_no.as_str())
            .bind(order.user_id.into_i64())
            .bind(amount_param(order.bill_money, "bill_money")?)
            .bind(amount_param(order.pay_money, "pay_money")?)
            .bind(amount_param(order.vip_discount_money, "vip_discount_money")?)
            .bind(order.coupon_id)
            .bind(amount_param(order.coupon_money, "coupon_money")?)
            .bind(order.discount_id)
            .bind(amount_param(order.discount_money, "discount_money")?)
            .bind(OrderStatus::Created.as_i16())
            .bind(PayState::Unpaid.as_i16())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_no(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_no: &OrderNo,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_NO_SQL)
            .bind(order_no.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        pagination: Pagination,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_i64())
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_user_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_USER_ORDERS_SQL)
            .bind(user.into_i64())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }

    /// Move the order from `from` to `to`. Returns 0 if the order was no longer in `from`.
    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_i64())
            .bind(from.as_i16())
            .bind(to.as_i16())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn decode_smallint<T: TryFrom<i16, Error = i16>>(row: &PgRow, col: &str) -> sqlx::Result<T> {
    let value: i16 = row.try_get(col)?;

    T::try_from(value).map_err(|value| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: format!("unknown {col} {value}").into(),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: OrderId::from_i64(row.try_get("id")?),
            order_no: OrderNo::new(row.try_get::<String, _>("order_no")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            bill_money: try_get_amount(row, "bill_money")?,
            pay_money: try_get_amount(row, "pay_money")?,
            vip_discount_money: try_get_amount(row, "vip_discount_money")?,
            coupon_id: row.try_get("coupon_id")?,
            coupon_money: try_get_amount(row, "coupon_money")?,
            discount_id: row.try_get("discount_id")?,
            discount_money: try_get_amount(row, "discount_money")?,
            status: decode_smallint(row, "order_status")?,
            pay_state: decode_smallint(row, "pay_state")?,
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            address: None,
            items: Vec::new(),
        })
    }
}
