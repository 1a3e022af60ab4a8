//! Order Records

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{commodities::records::CommodityId, users::UserId},
    ids::TypedId,
};

/// Order ID
pub type OrderId = TypedId<OrderRecord>;

/// Public order number, distinct from the internal id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNo(String);

impl OrderNo {
    #[must_use]
    pub fn new(order_no: impl Into<String>) -> Self {
        Self(order_no.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderNo {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order lifecycle. Stored as `SMALLINT`; the numeric order is the lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Paid,
    Delivering,
    Delivered,
    Finished,
    CancelledByUser,
    Closed,
}

impl OrderStatus {
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Created => 0,
            Self::Paid => 1,
            Self::Delivering => 2,
            Self::Delivered => 3,
            Self::Finished => 4,
            Self::CancelledByUser => 5,
            Self::Closed => 6,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
            Self::Finished => "finished",
            Self::CancelledByUser => "cancelled_by_user",
            Self::Closed => "closed",
        }
    }

    /// Only unpaid, freshly created orders may be cancelled by their owner.
    #[must_use]
    pub fn is_cancellable(self) -> bool {
        self == Self::Created
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Created),
            1 => Ok(Self::Paid),
            2 => Ok(Self::Delivering),
            3 => Ok(Self::Delivered),
            4 => Ok(Self::Finished),
            5 => Ok(Self::CancelledByUser),
            6 => Ok(Self::Closed),
            other => Err(other),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayState {
    Unpaid,
    Paid,
}

impl PayState {
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Unpaid => 0,
            Self::Paid => 1,
        }
    }
}

impl TryFrom<i16> for PayState {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unpaid),
            1 => Ok(Self::Paid),
            other => Err(other),
        }
    }
}

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_no: OrderNo,
    pub user_id: UserId,

    /// Total before any benefit.
    pub bill_money: u64,

    /// Amount due.
    pub pay_money: u64,

    pub vip_discount_money: u64,
    pub coupon_id: i64,
    pub coupon_money: u64,
    pub discount_id: i64,
    pub discount_money: u64,
    pub status: OrderStatus,
    pub pay_state: PayState,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub address: Option<OrderAddressRecord>,
    pub items: Vec<OrderItemRecord>,
}

/// Order line, snapshotting the commodity as it was at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemRecord {
    pub order_id: OrderId,
    pub commodity_id: CommodityId,
    pub commodity_name: String,
    pub commodity_img: String,
    pub commodity_selling_price: u64,
    pub commodity_num: u32,
}

/// Shipping address snapshot taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAddressRecord {
    pub order_id: OrderId,
    pub user_name: String,
    pub user_phone: String,
    pub province_name: String,
    pub city_name: String,
    pub region_name: String,
    pub detail_address: String,
}
