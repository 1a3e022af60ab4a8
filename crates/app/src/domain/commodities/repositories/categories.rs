//! Categories Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::commodities::{
    data::NewCategory,
    records::{CategoryId, CategoryRecord},
};

const CREATE_CATEGORY_SQL: &str = include_str!("../sql/create_category.sql");
const GET_CATEGORY_SQL: &str = include_str!("../sql/get_category.sql");
const LIST_CATEGORIES_SQL: &str = include_str!("../sql/list_categories.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: &NewCategory,
        level: i16,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(CREATE_CATEGORY_SQL)
            .bind(category.parent_id.map(CategoryId::into_i64))
            .bind(level)
            .bind(&category.name)
            .bind(category.rank)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryId,
    ) -> Result<Option<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_CATEGORY_SQL)
            .bind(category.into_i64())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Children of `parent`, or the top level when `parent` is `None`. Highest rank first.
    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        parent: Option<CategoryId>,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(LIST_CATEGORIES_SQL)
            .bind(parent.map(CategoryId::into_i64))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: CategoryId::from_i64(row.try_get("id")?),
            parent_id: row
                .try_get::<Option<i64>, _>("parent_id")?
                .map(CategoryId::from_i64),
            level: row.try_get("level")?,
            name: row.try_get("name")?,
            rank: row.try_get("rank")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
