//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use emporium::prelude::{BenefitSource, BillChain, BillInfo, BillLine};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{
                MAX_ADD_QUANTITY, MAX_LINE_QUANTITY, NewCartItem, SelectionProblem,
                check_selection, normalize_selection,
            },
            errors::CartsServiceError,
            records::{CartItemId, CartItemRecord, CartLine},
            repository::PgCartItemsRepository,
        },
        commodities::{records::SellStatus, repositories::PgCommoditiesRepository},
        users::UserId,
    },
};

#[derive(Clone)]
pub struct PgCartsService {
    db: Db,
    items: PgCartItemsRepository,
    commodities: PgCommoditiesRepository,
    benefits: Arc<dyn BenefitSource>,
    chain: BillChain,
}

impl fmt::Debug for PgCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCartsService")
            .field("db", &self.db)
            .field("benefits", &self.benefits)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, benefits: Arc<dyn BenefitSource>) -> Self {
        Self {
            db,
            items: PgCartItemsRepository::new(),
            commodities: PgCommoditiesRepository::new(),
            benefits,
            chain: BillChain::standard(),
        }
    }
}

fn check_quantity(quantity: u32, max: u32) -> Result<(), CartsServiceError> {
    if (1..=max).contains(&quantity) {
        Ok(())
    } else {
        Err(CartsServiceError::InvalidQuantity { quantity, max })
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(
            user_id = %user,
            commodity_id = %item.commodity_id,
            quantity = item.quantity
        ),
        err
    )]
    async fn add_item(
        &self,
        user: UserId,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        check_quantity(item.quantity, MAX_ADD_QUANTITY)?;

        let mut tx = self.db.begin_transaction().await?;

        let commodity = self
            .commodities
            .get_commodity(&mut tx, item.commodity_id)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::CommodityNotFound(item.commodity_id),
                other => other.into(),
            })?;

        if commodity.sell_status != SellStatus::OnSale {
            return Err(CartsServiceError::CommodityNotFound(commodity.id));
        }

        if commodity.stock_num < item.quantity {
            return Err(CartsServiceError::StockExhausted(commodity.id));
        }

        let record = self
            .items
            .upsert_cart_item(
                &mut tx,
                user,
                item.commodity_id,
                item.quantity,
                MAX_LINE_QUANTITY,
            )
            .await?
            .ok_or(CartsServiceError::LineLimitExceeded(MAX_LINE_QUANTITY))?;

        tx.commit().await?;

        info!(cart_item_id = %record.id, commodity_num = record.commodity_num, "added cart item");

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self),
        fields(user_id = %user, cart_item_id = %item),
        err
    )]
    async fn update_item(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError> {
        check_quantity(quantity, MAX_LINE_QUANTITY)?;

        let mut tx = self.db.begin_transaction().await?;

        let existing = self.items.get_cart_item(&mut tx, item).await?;

        if existing.user_id != user {
            return Err(CartsServiceError::NotOwned);
        }

        let updated = self
            .items
            .update_cart_item(&mut tx, user, item, quantity)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn list_items(&self, user: UserId) -> Result<Vec<CartLine>, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let lines = self.items.list_cart_lines(&mut tx, user).await?;

        tx.commit().await?;

        Ok(lines)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_id = %user, cart_item_id = %item),
        err
    )]
    async fn remove_item(&self, user: UserId, item: CartItemId) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let existing = self.items.get_cart_item(&mut tx, item).await?;

        if existing.user_id != user {
            return Err(CartsServiceError::NotOwned);
        }

        let rows_affected = self.items.delete_cart_item(&mut tx, user, item).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.check_bill",
        skip(self, items),
        fields(user_id = %user, selected = items.len()),
        err
    )]
    async fn check_bill(
        &self,
        user: UserId,
        items: Vec<CartItemId>,
    ) -> Result<BillInfo, CartsServiceError> {
        let items = normalize_selection(items);

        let mut tx = self.db.begin_transaction().await?;

        let lines = self.items.get_cart_lines(&mut tx, &items).await?;

        tx.commit().await?;

        check_selection(user, &items, &lines).map_err(|problem| match problem {
            SelectionProblem::Empty => CartsServiceError::NothingSelected,
            SelectionProblem::NotOwned => CartsServiceError::NotOwned,
            SelectionProblem::Missing => CartsServiceError::NotFound,
        })?;

        let bill_lines: Vec<BillLine> = lines.iter().map(CartLine::bill_line).collect();

        let bill = self
            .chain
            .calculate(user.into_i64(), &bill_lines, self.benefits.as_ref())?;

        Ok(bill)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Put `item.quantity` units of a commodity in the user's cart, merging with any existing
    /// line for the same commodity.
    async fn add_item(
        &self,
        user: UserId,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Set the quantity of one of the user's cart lines.
    async fn update_item(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// The user's cart with current commodity details.
    async fn list_items(&self, user: UserId) -> Result<Vec<CartLine>, CartsServiceError>;

    /// Remove one of the user's cart lines.
    async fn remove_item(&self, user: UserId, item: CartItemId) -> Result<(), CartsServiceError>;

    /// Preview the bill for a selection of the user's cart lines.
    async fn check_bill(
        &self,
        user: UserId,
        items: Vec<CartItemId>,
    ) -> Result<BillInfo, CartsServiceError>;
}
