//! Orders service.

use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use emporium::prelude::{BenefitSource, BillChain, BillLine};
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::{Span, error, info};

use crate::{
    database::{Db, with_deadline},
    domain::{
        addresses::{records::AddressId, repository::PgAddressesRepository},
        carts::{
            data::{SelectionProblem, check_selection, normalize_selection},
            records::{CartItemId, CartLine},
            repository::PgCartItemsRepository,
        },
        commodities::{
            records::{CommodityId, StockMovement},
            repositories::PgStockRepository,
        },
        orders::{
            data::{NewOrder, NewOrderAddress, NewOrderItem, OrderPage},
            errors::OrdersServiceError,
            order_no::{OrderNoGenerator, TimestampOrderNoGenerator},
            records::{OrderItemRecord, OrderNo, OrderRecord, OrderStatus},
            repositories::{
                PgOrderAddressesRepository, PgOrderItemsRepository, PgOrdersRepository,
            },
        },
        pagination::Pagination,
        users::UserId,
    },
};

/// How long checkout or cancellation may take unless configured otherwise.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    addresses: PgOrderAddressesRepository,
    cart_items: PgCartItemsRepository,
    user_addresses: PgAddressesRepository,
    stock: PgStockRepository,
    benefits: Arc<dyn BenefitSource>,
    order_nos: Arc<dyn OrderNoGenerator>,
    chain: BillChain,
    deadline: Duration,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("benefits", &self.benefits)
            .field("chain", &self.chain)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, benefits: Arc<dyn BenefitSource>) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            addresses: PgOrderAddressesRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            user_addresses: PgAddressesRepository::new(),
            stock: PgStockRepository::new(),
            benefits,
            order_nos: Arc::new(TimestampOrderNoGenerator),
            chain: BillChain::standard(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    #[must_use]
    pub fn with_order_nos(mut self, order_nos: Arc<dyn OrderNoGenerator>) -> Self {
        self.order_nos = order_nos;
        self
    }

    /// Bound every checkout and cancellation transaction by `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    async fn checkout(
        &self,
        user: UserId,
        cart_items: &[CartItemId],
        address: AddressId,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction_with_deadline(self.deadline).await?;

        let lines = self.cart_items.get_cart_lines(&mut tx, cart_items).await?;

        check_selection(user, cart_items, &lines).map_err(|problem| match problem {
            SelectionProblem::Empty => OrdersServiceError::EmptyBill,
            SelectionProblem::NotOwned => OrdersServiceError::CartItemsNotOwned,
            SelectionProblem::Missing => OrdersServiceError::CartItemsGone,
        })?;

        let shipping = self
            .user_addresses
            .get_address(&mut tx, address)
            .await?
            .filter(|record| record.user_id == user)
            .ok_or(OrdersServiceError::AddressNotOwned)?;

        let bill_lines: Vec<BillLine> = lines.iter().map(CartLine::bill_line).collect();

        let bill = self
            .chain
            .calculate(user.into_i64(), &bill_lines, self.benefits.as_ref())?;

        if bill.original_total_price == 0 {
            return Err(OrdersServiceError::EmptyBill);
        }

        let new_order = NewOrder::from_bill(self.order_nos.generate(user), user, &bill)?;

        Span::current().record("order_no", tracing::field::display(&new_order.order_no));

        let mut order = self.orders.create_order(&mut tx, &new_order).await?;

        let new_items: Vec<NewOrderItem> = lines.iter().map(NewOrderItem::from).collect();

        order.items = self
            .items
            .create_order_items(&mut tx, order.id, &new_items)
            .await?;

        order.address = Some(
            self.addresses
                .create_order_address(&mut tx, order.id, &NewOrderAddress::from(&shipping))
                .await?,
        );

        // A concurrent checkout of the same lines holds their row locks until it ends; once it
        // commits they are gone and this delete comes up short.
        let removed = self
            .cart_items
            .delete_cart_items(&mut tx, user, cart_items)
            .await?;

        if removed != u64::try_from(cart_items.len())? {
            return Err(OrdersServiceError::CartItemsGone);
        }

        // Last, to hold commodity row locks as briefly as possible.
        for (commodity, quantity) in stock_movements(&order.items) {
            if let StockMovement::Insufficient { available } =
                self.stock.debit(&mut tx, commodity, quantity).await?
            {
                return Err(OrdersServiceError::StockExhausted {
                    commodity,
                    requested: quantity,
                    available,
                });
            }
        }

        tx.commit().await?;

        Ok(order)
    }

    async fn mark_cancelled(
        &self,
        user: UserId,
        order_no: &OrderNo,
    ) -> Result<(OrderRecord, Vec<OrderItemRecord>), OrdersServiceError> {
        let mut tx = self.db.begin_transaction_with_deadline(self.deadline).await?;

        let order = self
            .orders
            .get_order_by_no(&mut tx, order_no)
            .await?
            .filter(|order| order.user_id == user)
            .ok_or(OrdersServiceError::OrderNotFound)?;

        if !order.status.is_cancellable() {
            return Err(OrdersServiceError::OrderCannotBeChanged);
        }

        let updated = self
            .orders
            .update_order_status(
                &mut tx,
                order.id,
                OrderStatus::Created,
                OrderStatus::CancelledByUser,
            )
            .await?;

        // Lost a race with another status change.
        if updated == 0 {
            return Err(OrdersServiceError::OrderCannotBeChanged);
        }

        let items = self.items.get_order_items(&mut tx, &[order.id]).await?;

        tx.commit().await?;

        Ok((order, items))
    }

    async fn restock(&self, items: &[OrderItemRecord]) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin_transaction_with_deadline(self.deadline).await?;

        for (commodity, quantity) in stock_movements(items) {
            self.stock.credit(&mut tx, commodity, quantity).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn load_details(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), OrdersServiceError> {
        let ids: Vec<_> = orders.iter().map(|order| order.id).collect();

        let mut items: FxHashMap<_, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in self.items.get_order_items(tx, &ids).await? {
            items.entry(item.order_id).or_default().push(item);
        }

        let mut addresses: FxHashMap<_, _> = self
            .addresses
            .get_order_addresses(tx, &ids)
            .await?
            .into_iter()
            .map(|address| (address.order_id, address))
            .collect();

        for order in orders {
            order.items = items.remove(&order.id).unwrap_or_default();
            order.address = addresses.remove(&order.id);
        }

        Ok(())
    }
}

/// Total quantity per commodity, in ascending commodity order so that concurrent transactions
/// lock rows in the same sequence.
fn stock_movements(items: &[OrderItemRecord]) -> BTreeMap<CommodityId, u32> {
    let mut movements = BTreeMap::new();

    for item in items {
        let quantity = movements.entry(item.commodity_id).or_insert(0_u32);
        *quantity = quantity.saturating_add(item.commodity_num);
    }

    movements
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, cart_items),
        fields(
            user_id = %user,
            address_id = %address,
            selected = cart_items.len(),
            order_no = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(
        &self,
        user: UserId,
        cart_items: Vec<CartItemId>,
        address: AddressId,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let cart_items = normalize_selection(cart_items);

        let order = with_deadline(self.deadline, self.checkout(user, &cart_items, address)).await?;

        info!(
            order_no = %order.order_no,
            bill_money = order.bill_money,
            pay_money = order.pay_money,
            "created order"
        );

        Ok(order)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, order_no),
        fields(user_id = %user, order_no = %order_no),
        err
    )]
    async fn cancel_order(
        &self,
        user: UserId,
        order_no: OrderNo,
    ) -> Result<(), OrdersServiceError> {
        let (order, items) =
            with_deadline(self.deadline, self.mark_cancelled(user, &order_no)).await?;

        info!(order_id = %order.id, "cancelled order");

        // The cancellation stands even if stock cannot be credited back.
        if let Err(source) = with_deadline(self.deadline, self.restock(&items)).await {
            let commodity_ids: Vec<i64> = items
                .iter()
                .map(|item| item.commodity_id.into_i64())
                .collect();

            let error = OrdersServiceError::StockNotRestored {
                order_no: order_no.clone(),
                source: Box::new(source),
            };

            error!(
                reconciliation = true,
                class = %error.class(),
                order_no = %order_no,
                commodity_ids = ?commodity_ids,
                error = %error,
                cause = ?std::error::Error::source(&error),
                "stock not restored after cancellation"
            );
        }

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self, order_no),
        fields(user_id = %user, order_no = %order_no),
        err
    )]
    async fn get_order(
        &self,
        user: UserId,
        order_no: OrderNo,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self
            .orders
            .get_order_by_no(&mut tx, &order_no)
            .await?
            .filter(|order| order.user_id == user)
            .ok_or(OrdersServiceError::OrderNotFound)?;

        let mut orders = [order];

        self.load_details(&mut tx, &mut orders).await?;

        tx.commit().await?;

        let [order] = orders;

        Ok(order)
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self),
        fields(user_id = %user, page = pagination.page(), page_size = pagination.page_size()),
        err
    )]
    async fn list_orders(
        &self,
        user: UserId,
        pagination: Pagination,
    ) -> Result<OrderPage, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let total_rows = self.orders.count_user_orders(&mut tx, user).await?;

        let mut orders = self
            .orders
            .list_user_orders(&mut tx, user, pagination)
            .await?;

        self.load_details(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(OrderPage {
            orders,
            pagination,
            total_rows,
        })
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Check out the selected cart lines to `address`.
    ///
    /// The order, its items and address, the removal of the cart lines and the stock debit
    /// commit together or not at all.
    async fn create_order(
        &self,
        user: UserId,
        cart_items: Vec<CartItemId>,
        address: AddressId,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel an unpaid order and put its stock back.
    ///
    /// Stock is credited in a separate transaction after the status change commits; a failed
    /// credit is logged for reconciliation and does not fail the call.
    async fn cancel_order(&self, user: UserId, order_no: OrderNo) -> Result<(), OrdersServiceError>;

    /// One of the user's orders with items and address.
    async fn get_order(
        &self,
        user: UserId,
        order_no: OrderNo,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// A page of the user's orders, newest first.
    async fn list_orders(
        &self,
        user: UserId,
        pagination: Pagination,
    ) -> Result<OrderPage, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use emporium::prelude::{FixedBenefits, NoBenefits, ThresholdBenefit, VipRate};
    use testresult::TestResult;

    use crate::{
        domain::{
            addresses::records::AddressRecord,
            carts::CartsService,
            commodities::records::CommodityRecord,
            orders::{ErrorClass, order_no::MockOrderNoGenerator, records::PayState},
        },
        test::{
            TestContext,
            helpers::{add_to_cart, cart_item_ids, create_address, create_commodity, stock_of},
        },
    };

    use super::*;

    const USER: UserId = UserId::from_i64(42);
    const OTHER_USER: UserId = UserId::from_i64(43);

    struct Scenario {
        x: CommodityRecord,
        y: CommodityRecord,
        cart_items: Vec<CartItemId>,
        address: AddressRecord,
    }

    /// Commodity X at 500 × 2 and Y at 300 × 1 in `USER`'s cart.
    async fn scenario(ctx: &TestContext, stock_x: u32, stock_y: u32) -> TestResult<Scenario> {
        let x = create_commodity(ctx, "X", 500, stock_x).await?;
        let y = create_commodity(ctx, "Y", 300, stock_y.max(1)).await?;

        let a = add_to_cart(ctx, USER, x.id, 2).await?;
        let b = add_to_cart(ctx, USER, y.id, 1).await?;

        // Stock may only drop to zero after the line is in the cart.
        if stock_y == 0 {
            sqlx::query("UPDATE commodities SET stock_num = 0 WHERE id = $1")
                .bind(y.id.into_i64())
                .execute(ctx.db.pool())
                .await?;
        }

        let address = create_address(ctx, USER).await?;

        Ok(Scenario {
            x,
            y,
            cart_items: vec![a.id, b.id],
            address,
        })
    }

    #[tokio::test]
    async fn checkout_debits_stock_and_clears_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await?;

        assert_eq!(order.bill_money, 1_300);
        assert_eq!(order.pay_money, 1_300);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.pay_state, PayState::Unpaid);
        assert_eq!(order.items.len(), 2);
        assert_eq!(
            order.address.as_ref().map(|a| a.user_name.as_str()),
            Some(s.address.user_name.as_str())
        );

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);
        assert_eq!(stock_of(&ctx, s.y.id).await, 0);
        assert!(ctx.carts.list_items(USER).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn stock_exhausted_rolls_back_everything() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 0).await?;

        let result = ctx
            .orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::StockExhausted {
                    commodity,
                    requested: 1,
                    available: 0,
                }) if commodity == s.y.id
            ),
            "expected StockExhausted for Y, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, s.x.id).await, 10);
        assert_eq!(stock_of(&ctx, s.y.id).await, 0);
        assert_eq!(cart_item_ids(&ctx, USER).await?, s.cart_items);

        let page = ctx.orders.list_orders(USER, Pagination::default()).await?;

        assert_eq!(page.total_rows, 0);

        Ok(())
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_cannot_repeat() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await?;

        assert_eq!(order.pay_money, 1_300);

        ctx.orders
            .cancel_order(USER, order.order_no.clone())
            .await?;

        let cancelled = ctx.orders.get_order(USER, order.order_no.clone()).await?;

        assert_eq!(cancelled.status, OrderStatus::CancelledByUser);
        assert_eq!(stock_of(&ctx, s.x.id).await, 10);
        assert_eq!(stock_of(&ctx, s.y.id).await, 1);

        let again = ctx.orders.cancel_order(USER, order.order_no).await;

        assert!(
            matches!(again, Err(OrdersServiceError::OrderCannotBeChanged)),
            "expected OrderCannotBeChanged, got {again:?}"
        );

        // The failed second attempt must not credit stock again.
        assert_eq!(stock_of(&ctx, s.x.id).await, 10);

        Ok(())
    }

    #[tokio::test]
    async fn paid_orders_cannot_be_cancelled() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items, s.address.id)
            .await?;

        sqlx::query("UPDATE orders SET order_status = $2, pay_state = 1 WHERE id = $1")
            .bind(order.id.into_i64())
            .bind(OrderStatus::Paid.as_i16())
            .execute(ctx.db.pool())
            .await?;

        let result = ctx.orders.cancel_order(USER, order.order_no).await;

        assert!(
            matches!(result, Err(OrdersServiceError::OrderCannotBeChanged)),
            "expected OrderCannotBeChanged, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_persists_the_bill_breakdown() -> TestResult {
        let ctx = TestContext::with_benefits(FixedBenefits {
            coupon: Some(ThresholdBenefit {
                id: 11,
                name: "welcome".to_string(),
                discount_money: 100,
                threshold: 100,
            }),
            discount: Some(ThresholdBenefit {
                id: 12,
                name: "spend 1000".to_string(),
                discount_money: 100,
                threshold: 1_000,
            }),
            vip_rate: VipRate::new(10)?,
        })
        .await;

        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items, s.address.id)
            .await?;

        // 1300 - 130 (vip) - 100 (coupon) = 1070 > 1000 - 100 (discount)
        assert_eq!(order.bill_money, 1_300);
        assert_eq!(order.vip_discount_money, 130);
        assert_eq!(order.coupon_id, 11);
        assert_eq!(order.coupon_money, 100);
        assert_eq!(order.discount_id, 12);
        assert_eq!(order.discount_money, 100);
        assert_eq!(order.pay_money, 970);

        Ok(())
    }

    #[tokio::test]
    async fn other_users_cart_lines_are_rejected_before_any_write() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let address = create_address(&ctx, OTHER_USER).await?;

        let result = ctx
            .orders
            .create_order(OTHER_USER, s.cart_items.clone(), address.id)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::CartItemsNotOwned)),
            "expected CartItemsNotOwned, got {result:?}"
        );

        assert!(
            result
                .as_ref()
                .err()
                .is_some_and(|e| e.class() == ErrorClass::Validation)
        );

        assert_eq!(cart_item_ids(&ctx, USER).await?, s.cart_items);
        assert_eq!(stock_of(&ctx, s.x.id).await, 10);

        Ok(())
    }

    #[tokio::test]
    async fn other_users_address_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let address = create_address(&ctx, OTHER_USER).await?;

        let result = ctx
            .orders
            .create_order(USER, s.cart_items, address.id)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::AddressNotOwned)),
            "expected AddressNotOwned, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let address = create_address(&ctx, USER).await?;

        let result = ctx.orders.create_order(USER, Vec::new(), address.id).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyBill)),
            "expected EmptyBill, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn zero_value_cart_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let freebie = create_commodity(&ctx, "Sticker", 0, 10).await?;
        let item = add_to_cart(&ctx, USER, freebie.id, 1).await?;
        let address = create_address(&ctx, USER).await?;

        let result = ctx.orders.create_order(USER, vec![item.id], address.id).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyBill)),
            "expected EmptyBill, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, freebie.id).await, 10);

        Ok(())
    }

    #[tokio::test]
    async fn resubmitting_a_purchased_selection_fails_cleanly() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 5).await?;

        ctx.orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await?;

        let result = ctx
            .orders
            .create_order(USER, s.cart_items, s.address.id)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::CartItemsGone)),
            "expected CartItemsGone, got {result:?}"
        );

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_double_submit_creates_one_order() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 5).await?;

        let (first, second) = tokio::join!(
            ctx.orders
                .create_order(USER, s.cart_items.clone(), s.address.id),
            ctx.orders
                .create_order(USER, s.cart_items.clone(), s.address.id),
        );

        let outcomes = [first, second];

        let created = outcomes.iter().filter(|r| r.is_ok()).count();

        assert_eq!(created, 1, "expected exactly one order, got {outcomes:?}");

        for outcome in &outcomes {
            if let Err(error) = outcome {
                assert!(
                    matches!(
                        error,
                        OrdersServiceError::CartItemsGone
                            | OrdersServiceError::StockExhausted { .. }
                    ),
                    "unexpected failure {error:?}"
                );
            }
        }

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);
        assert_eq!(stock_of(&ctx, s.y.id).await, 4);

        let page = ctx.orders.list_orders(USER, Pagination::default()).await?;

        assert_eq!(page.total_rows, 1);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_checkouts_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;

        let last = create_commodity(&ctx, "Last one", 700, 1).await?;

        let a = add_to_cart(&ctx, USER, last.id, 1).await?;
        let b = add_to_cart(&ctx, OTHER_USER, last.id, 1).await?;

        let address_a = create_address(&ctx, USER).await?;
        let address_b = create_address(&ctx, OTHER_USER).await?;

        let (first, second) = tokio::join!(
            ctx.orders.create_order(USER, vec![a.id], address_a.id),
            ctx.orders.create_order(OTHER_USER, vec![b.id], address_b.id),
        );

        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);

        assert!(
            outcomes.iter().any(|r| matches!(
                r,
                Err(OrdersServiceError::StockExhausted { available: 0, .. })
            )),
            "expected one StockExhausted, got {outcomes:?}"
        );

        assert_eq!(stock_of(&ctx, last.id).await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn order_number_collision_is_retryable() -> TestResult {
        let ctx = TestContext::new().await;

        let mut order_nos = MockOrderNoGenerator::new();

        order_nos
            .expect_generate()
            .returning(|_| OrderNo::new("202610160000000000042000001"));

        let orders = PgOrdersService::new(ctx.handle(), Arc::new(NoBenefits))
            .with_order_nos(Arc::new(order_nos));

        let mug = create_commodity(&ctx, "Mug", 500, 10).await?;
        let bowl = create_commodity(&ctx, "Bowl", 400, 10).await?;

        let first = add_to_cart(&ctx, USER, mug.id, 1).await?;
        let second = add_to_cart(&ctx, USER, bowl.id, 1).await?;

        let address = create_address(&ctx, USER).await?;

        orders.create_order(USER, vec![first.id], address.id).await?;

        let result = orders.create_order(USER, vec![second.id], address.id).await;

        assert!(
            matches!(result, Err(OrdersServiceError::OrderNoCollision)),
            "expected OrderNoCollision, got {result:?}"
        );

        assert!(result.as_ref().err().is_some_and(OrdersServiceError::is_retryable));
        assert_eq!(stock_of(&ctx, bowl.id).await, 10);
        assert_eq!(cart_item_ids(&ctx, USER).await?, vec![second.id]);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_gives_up_when_stock_stays_locked() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let mut blocker = ctx.db.begin_test_transaction().await;

        sqlx::query("SELECT stock_num FROM commodities WHERE id = $1 FOR UPDATE")
            .bind(s.x.id.into_i64())
            .fetch_one(&mut *blocker)
            .await?;

        let orders = PgOrdersService::new(ctx.handle(), Arc::new(NoBenefits))
            .with_deadline(Duration::from_millis(300));

        let result = orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Timeout(_) | OrdersServiceError::DeadlineExceeded(_))
            ),
            "expected a timeout, got {result:?}"
        );

        assert!(result.as_ref().err().is_some_and(OrdersServiceError::is_retryable));

        blocker.rollback().await?;

        assert_eq!(stock_of(&ctx, s.x.id).await, 10);
        assert_eq!(cart_item_ids(&ctx, USER).await?, s.cart_items);

        Ok(())
    }

    #[tokio::test]
    async fn cancellation_stands_when_stock_cannot_be_credited() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items.clone(), s.address.id)
            .await?;

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);

        let mut blocker = ctx.db.begin_test_transaction().await;

        sqlx::query("SELECT stock_num FROM commodities WHERE id = $1 FOR UPDATE")
            .bind(s.x.id.into_i64())
            .fetch_one(&mut *blocker)
            .await?;

        let orders = PgOrdersService::new(ctx.handle(), Arc::new(NoBenefits))
            .with_deadline(Duration::from_millis(300));

        orders.cancel_order(USER, order.order_no.clone()).await?;

        blocker.rollback().await?;

        let cancelled = ctx.orders.get_order(USER, order.order_no.clone()).await?;

        assert_eq!(cancelled.status, OrderStatus::CancelledByUser);

        // Left for reconciliation: the credit was rolled back as a whole.
        assert_eq!(stock_of(&ctx, s.x.id).await, 8);
        assert_eq!(stock_of(&ctx, s.y.id).await, 0);

        let again = ctx.orders.cancel_order(USER, order.order_no).await;

        assert!(
            matches!(again, Err(OrdersServiceError::OrderCannotBeChanged)),
            "expected OrderCannotBeChanged, got {again:?}"
        );

        assert_eq!(stock_of(&ctx, s.x.id).await, 8);

        Ok(())
    }

    #[tokio::test]
    async fn order_lines_keep_the_price_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items, s.address.id)
            .await?;

        sqlx::query("UPDATE commodities SET selling_price = 9999, name = 'Renamed' WHERE id = $1")
            .bind(s.x.id.into_i64())
            .execute(ctx.db.pool())
            .await?;

        let fetched = ctx.orders.get_order(USER, order.order_no).await?;

        let x_line = fetched
            .items
            .iter()
            .find(|item| item.commodity_id == s.x.id)
            .expect("missing line for X");

        assert_eq!(x_line.commodity_name, "X");
        assert_eq!(x_line.commodity_selling_price, 500);
        assert_eq!(x_line.commodity_num, 2);

        Ok(())
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_cancel_an_order() -> TestResult {
        let ctx = TestContext::new().await;
        let s = scenario(&ctx, 10, 1).await?;

        let order = ctx
            .orders
            .create_order(USER, s.cart_items, s.address.id)
            .await?;

        let get = ctx
            .orders
            .get_order(OTHER_USER, order.order_no.clone())
            .await;

        assert!(
            matches!(get, Err(OrdersServiceError::OrderNotFound)),
            "expected OrderNotFound, got {get:?}"
        );

        let cancel = ctx
            .orders
            .cancel_order(OTHER_USER, order.order_no.clone())
            .await;

        assert!(
            matches!(cancel, Err(OrdersServiceError::OrderNotFound)),
            "expected OrderNotFound, got {cancel:?}"
        );

        let unchanged = ctx.orders.get_order(USER, order.order_no).await?;

        assert_eq!(unchanged.status, OrderStatus::Created);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_pages_newest_first() -> TestResult {
        let ctx = TestContext::new().await;

        let mug = create_commodity(&ctx, "Mug", 500, 10).await?;
        let address = create_address(&ctx, USER).await?;

        let mut created = Vec::new();

        for _ in 0..3 {
            let item = add_to_cart(&ctx, USER, mug.id, 1).await?;

            created.push(
                ctx.orders
                    .create_order(USER, vec![item.id], address.id)
                    .await?
                    .order_no,
            );
        }

        let first_page = ctx.orders.list_orders(USER, Pagination::new(1, 2)).await?;

        assert_eq!(first_page.total_rows, 3);

        let numbers: Vec<OrderNo> = first_page
            .orders
            .iter()
            .map(|o| o.order_no.clone())
            .collect();

        let newest: Vec<OrderNo> = created.iter().rev().take(2).cloned().collect();

        assert_eq!(numbers, newest);
        assert!(first_page.orders.iter().all(|o| o.items.len() == 1 && o.address.is_some()));

        let second_page = ctx.orders.list_orders(USER, Pagination::new(2, 2)).await?;

        assert_eq!(second_page.orders.len(), 1);

        let other = ctx.orders.list_orders(OTHER_USER, Pagination::default()).await?;

        assert_eq!(other.total_rows, 0);

        Ok(())
    }
}
