//! Commodities Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    database::{amount_param, quantity_param, try_get_amount, try_get_quantity},
    domain::{
        commodities::{
            data::{CommodityFilter, NewCommodity},
            records::{CategoryId, CommodityId, CommodityRecord, SellStatus},
        },
        pagination::Pagination,
    },
};

const CREATE_COMMODITY_SQL: &str = include_str!("../sql/create_commodity.sql");
const GET_COMMODITY_SQL: &str = include_str!("../sql/get_commodity.sql");
const FIND_COMMODITIES_SQL: &str = include_str!("../sql/find_commodities.sql");
const LIST_COMMODITIES_SQL: &str = include_str!("../sql/list_commodities.sql");
const COUNT_COMMODITIES_SQL: &str = include_str!("../sql/count_commodities.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCommoditiesRepository;

impl PgCommoditiesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_commodity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: &NewCommodity,
    ) -> Result<CommodityRecord, sqlx::Error> {
        query_as::<Postgres, CommodityRecord>(CREATE_COMMODITY_SQL)
            .bind(&commodity.name)
            .bind(&commodity.cover_img)
            .bind(commodity.category_id)
            .bind(amount_param(commodity.selling_price, "selling_price")?)
            .bind(quantity_param(commodity.stock_num, "stock_num")?)
            .bind(commodity.sell_status.as_i16())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_commodity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: CommodityId,
    ) -> Result<CommodityRecord, sqlx::Error> {
        query_as::<Postgres, CommodityRecord>(GET_COMMODITY_SQL)
            .bind(commodity.into_i64())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_commodities(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodities: &[CommodityId],
    ) -> Result<Vec<CommodityRecord>, sqlx::Error> {
        let ids: Vec<i64> = commodities.iter().map(|id| id.into_i64()).collect();

        query_as::<Postgres, CommodityRecord>(FIND_COMMODITIES_SQL)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_commodities(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &CommodityFilter,
        pagination: Pagination,
    ) -> Result<Vec<CommodityRecord>, sqlx::Error> {
        query_as::<Postgres, CommodityRecord>(LIST_COMMODITIES_SQL)
            .bind(filter.name_pattern())
            .bind(filter.category_id.map(CategoryId::into_i64))
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_commodities(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &CommodityFilter,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_COMMODITIES_SQL)
            .bind(filter.name_pattern())
            .bind(filter.category_id.map(CategoryId::into_i64))
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CommodityRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let sell_status: i16 = row.try_get("sell_status")?;

        let sell_status =
            SellStatus::try_from(sell_status).map_err(|value| sqlx::Error::ColumnDecode {
                index: "sell_status".to_string(),
                source: format!("unknown sell status {value}").into(),
            })?;

        Ok(Self {
            id: CommodityId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            cover_img: row.try_get("cover_img")?,
            category_id: row.try_get("category_id")?,
            selling_price: try_get_amount(row, "selling_price")?,
            stock_num: try_get_quantity(row, "stock_num")?,
            sell_status,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
