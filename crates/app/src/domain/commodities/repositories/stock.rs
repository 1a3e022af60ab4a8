//! Stock Repository
//!
//! The only code allowed to write `commodities.stock_num`. Every movement locks the row with
//! `FOR UPDATE` inside the caller's transaction, so concurrent movements on one commodity are
//! serialized by the database and the lock is held until that transaction ends.

use sqlx::{Postgres, Transaction, query, query_scalar};

use crate::{
    database::quantity_param,
    domain::commodities::records::{CommodityId, StockMovement},
};

const LOCK_COMMODITY_STOCK_SQL: &str = include_str!("../sql/lock_commodity_stock.sql");
const UPDATE_COMMODITY_STOCK_SQL: &str = include_str!("../sql/update_commodity_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStockRepository;

impl PgStockRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Take `quantity` units out of stock, refusing to go below zero.
    pub(crate) async fn debit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: CommodityId,
        quantity: u32,
    ) -> Result<StockMovement, sqlx::Error> {
        let available = self.lock(tx, commodity).await?;

        let Some(remaining) = available.checked_sub(quantity) else {
            return Ok(StockMovement::Insufficient { available });
        };

        self.write(tx, commodity, remaining).await?;

        Ok(StockMovement::Applied { remaining })
    }

    /// Put `quantity` units back into stock.
    pub(crate) async fn credit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: CommodityId,
        quantity: u32,
    ) -> Result<StockMovement, sqlx::Error> {
        let available = self.lock(tx, commodity).await?;

        let remaining = available.checked_add(quantity).ok_or_else(|| {
            sqlx::Error::Encode(format!("stock_num of commodity {commodity} overflowed").into())
        })?;

        self.write(tx, commodity, remaining).await?;

        Ok(StockMovement::Applied { remaining })
    }

    async fn lock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: CommodityId,
    ) -> Result<u32, sqlx::Error> {
        let stock_num: i32 = query_scalar(LOCK_COMMODITY_STOCK_SQL)
            .bind(commodity.into_i64())
            .fetch_one(&mut **tx)
            .await?;

        u32::try_from(stock_num).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock_num".to_string(),
            source: Box::new(e),
        })
    }

    async fn write(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        commodity: CommodityId,
        stock_num: u32,
    ) -> Result<(), sqlx::Error> {
        query(UPDATE_COMMODITY_STOCK_SQL)
            .bind(commodity.into_i64())
            .bind(quantity_param(stock_num, "stock_num")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
