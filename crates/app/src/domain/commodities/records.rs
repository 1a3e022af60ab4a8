//! Commodity Records

use jiff::Timestamp;
use serde::Serialize;

use crate::ids::TypedId;

/// Commodity ID
pub type CommodityId = TypedId<CommodityRecord>;

/// Whether a commodity can currently be put in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SellStatus {
    OffSale,
    OnSale,
}

impl SellStatus {
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::OffSale => 0,
            Self::OnSale => 1,
        }
    }
}

impl TryFrom<i16> for SellStatus {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OffSale),
            1 => Ok(Self::OnSale),
            other => Err(other),
        }
    }
}

/// Commodity Record
#[derive(Debug, Clone, Serialize)]
pub struct CommodityRecord {
    pub id: CommodityId,
    pub name: String,
    pub cover_img: String,
    pub category_id: i64,
    pub selling_price: u64,
    pub stock_num: u32,
    pub sell_status: SellStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category ID
pub type CategoryId = TypedId<CategoryRecord>;

/// Deepest level of the category tree.
pub const MAX_CATEGORY_LEVEL: i16 = 3;

/// A node of the catalogue's category tree. Top-level categories have no parent and are
/// level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub level: i16,
    pub name: String,
    pub rank: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of a locked read-modify-write on a commodity's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMovement {
    /// Stock was written; `remaining` is the new count.
    Applied { remaining: u32 },

    /// Not enough stock; nothing was written.
    Insufficient { available: u32 },
}
