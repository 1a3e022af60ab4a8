//! Commodities service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        commodities::{
            data::{CommodityFilter, CommodityPage, NewCategory, NewCommodity},
            errors::CommoditiesServiceError,
            records::{
                CategoryId, CategoryRecord, CommodityId, CommodityRecord, MAX_CATEGORY_LEVEL,
            },
            repositories::{PgCategoriesRepository, PgCommoditiesRepository},
        },
        pagination::Pagination,
    },
};

#[derive(Debug, Clone)]
pub struct PgCommoditiesService {
    db: Db,
    repository: PgCommoditiesRepository,
    categories: PgCategoriesRepository,
}

impl PgCommoditiesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCommoditiesRepository::new(),
            categories: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl CommoditiesService for PgCommoditiesService {
    #[tracing::instrument(
        name = "commodities.service.create_commodity",
        skip(self, commodity),
        fields(commodity_id = tracing::field::Empty),
        err
    )]
    async fn create_commodity(
        &self,
        commodity: NewCommodity,
    ) -> Result<CommodityRecord, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_commodity(&mut tx, &commodity).await?;

        tx.commit().await?;

        tracing::Span::current().record("commodity_id", tracing::field::display(created.id));

        info!(commodity_id = %created.id, stock_num = created.stock_num, "created commodity");

        Ok(created)
    }

    async fn get_commodity(
        &self,
        commodity: CommodityId,
    ) -> Result<CommodityRecord, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let commodity = self.repository.get_commodity(&mut tx, commodity).await?;

        tx.commit().await?;

        Ok(commodity)
    }

    async fn find_commodities(
        &self,
        commodities: Vec<CommodityId>,
    ) -> Result<Vec<CommodityRecord>, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let found = self
            .repository
            .find_commodities(&mut tx, &commodities)
            .await?;

        tx.commit().await?;

        Ok(found)
    }

    #[tracing::instrument(
        name = "commodities.service.create_category",
        skip(self, category),
        fields(parent_id = ?category.parent_id),
        err
    )]
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let level = match category.parent_id {
            Some(parent) => {
                let parent = self
                    .categories
                    .get_category(&mut tx, parent)
                    .await?
                    .ok_or(CommoditiesServiceError::CategoryNotFound)?;

                parent.level + 1
            }
            None => 1,
        };

        if level > MAX_CATEGORY_LEVEL {
            return Err(CommoditiesServiceError::CategoryTooDeep(MAX_CATEGORY_LEVEL));
        }

        let created = self
            .categories
            .create_category(&mut tx, &category, level)
            .await?;

        tx.commit().await?;

        info!(category_id = %created.id, level, "created category");

        Ok(created)
    }

    async fn list_categories(
        &self,
        parent: Option<CategoryId>,
    ) -> Result<Vec<CategoryRecord>, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if let Some(parent) = parent {
            self.categories
                .get_category(&mut tx, parent)
                .await?
                .ok_or(CommoditiesServiceError::CategoryNotFound)?;
        }

        let categories = self.categories.list_categories(&mut tx, parent).await?;

        tx.commit().await?;

        Ok(categories)
    }

    async fn list_commodities(
        &self,
        filter: CommodityFilter,
        pagination: Pagination,
    ) -> Result<CommodityPage, CommoditiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if let Some(category) = filter.category_id {
            self.categories
                .get_category(&mut tx, category)
                .await?
                .ok_or(CommoditiesServiceError::CategoryNotFound)?;
        }

        let commodities = self
            .repository
            .list_commodities(&mut tx, &filter, pagination)
            .await?;

        let total_rows = self.repository.count_commodities(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(CommodityPage {
            commodities,
            pagination,
            total_rows,
        })
    }
}

#[automock]
#[async_trait]
pub trait CommoditiesService: Send + Sync {
    /// Creates a new commodity with its opening stock.
    async fn create_commodity(
        &self,
        commodity: NewCommodity,
    ) -> Result<CommodityRecord, CommoditiesServiceError>;

    /// Retrieve a single commodity.
    async fn get_commodity(
        &self,
        commodity: CommodityId,
    ) -> Result<CommodityRecord, CommoditiesServiceError>;

    /// Retrieve every commodity among `commodities` that exists, ordered by id.
    async fn find_commodities(
        &self,
        commodities: Vec<CommodityId>,
    ) -> Result<Vec<CommodityRecord>, CommoditiesServiceError>;

    /// Creates a category under `parent_id`, one level below it. Categories nest three
    /// levels deep.
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CommoditiesServiceError>;

    /// Direct children of `parent`, or the top-level categories. Highest rank first.
    async fn list_categories(
        &self,
        parent: Option<CategoryId>,
    ) -> Result<Vec<CategoryRecord>, CommoditiesServiceError>;

    /// One page of commodities matching `filter`, with the total number of matches.
    ///
    /// A category filter covers every category nested under it.
    async fn list_commodities(
        &self,
        filter: CommodityFilter,
        pagination: Pagination,
    ) -> Result<CommodityPage, CommoditiesServiceError>;
}
