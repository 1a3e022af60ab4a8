//! Cart Records

use emporium::lines::BillLine;
use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{commodities::records::CommodityId, users::UserId},
    ids::TypedId,
};

/// Cart Item ID
pub type CartItemId = TypedId<CartItemRecord>;

/// Cart Item Record
#[derive(Debug, Clone, Serialize)]
pub struct CartItemRecord {
    pub id: CartItemId,
    pub user_id: UserId,
    pub commodity_id: CommodityId,
    pub commodity_num: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart item joined with the commodity details current at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub cart_item_id: CartItemId,
    pub user_id: UserId,
    pub commodity_id: CommodityId,
    pub commodity_num: u32,
    pub commodity_name: String,
    pub commodity_img: String,
    pub commodity_selling_price: u64,
}

impl CartLine {
    /// The line as input to the bill chain.
    #[must_use]
    pub fn bill_line(&self) -> BillLine {
        BillLine::new(
            self.commodity_id.into_i64(),
            self.commodity_num,
            self.commodity_selling_price,
        )
    }
}
