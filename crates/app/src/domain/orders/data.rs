//! Order Data

use std::num::TryFromIntError;

use emporium::bill::BillInfo;
use serde::Serialize;

use crate::domain::{
    addresses::records::AddressRecord,
    carts::records::CartLine,
    commodities::records::CommodityId,
    orders::records::{OrderNo, OrderRecord},
    pagination::Pagination,
    users::UserId,
};

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_no: OrderNo,
    pub user_id: UserId,
    pub bill_money: u64,
    pub pay_money: u64,
    pub vip_discount_money: u64,
    pub coupon_id: i64,
    pub coupon_money: u64,
    pub discount_id: i64,
    pub discount_money: u64,
}

impl NewOrder {
    /// Order header for `bill`. A negative total is charged as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount due cannot be represented.
    pub fn from_bill(
        order_no: OrderNo,
        user_id: UserId,
        bill: &BillInfo,
    ) -> Result<Self, TryFromIntError> {
        let pay_money = u64::try_from(bill.total_price.max(0))?;

        Ok(Self {
            order_no,
            user_id,
            bill_money: bill.original_total_price,
            pay_money,
            vip_discount_money: bill.vip_discount_money,
            coupon_id: if bill.coupon_applied() { bill.coupon.id } else { 0 },
            coupon_money: bill.coupon_deduction,
            discount_id: if bill.discount_applied() {
                bill.discount.id
            } else {
                0
            },
            discount_money: bill.discount_deduction,
        })
    }
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub commodity_id: CommodityId,
    pub commodity_name: String,
    pub commodity_img: String,
    pub commodity_selling_price: u64,
    pub commodity_num: u32,
}

impl From<&CartLine> for NewOrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            commodity_id: line.commodity_id,
            commodity_name: line.commodity_name.clone(),
            commodity_img: line.commodity_img.clone(),
            commodity_selling_price: line.commodity_selling_price,
            commodity_num: line.commodity_num,
        }
    }
}

/// New Order Address Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderAddress {
    pub user_name: String,
    pub user_phone: String,
    pub province_name: String,
    pub city_name: String,
    pub region_name: String,
    pub detail_address: String,
}

impl From<&AddressRecord> for NewOrderAddress {
    fn from(address: &AddressRecord) -> Self {
        Self {
            user_name: address.user_name.clone(),
            user_phone: address.user_phone.clone(),
            province_name: address.province_name.clone(),
            city_name: address.city_name.clone(),
            region_name: address.region_name.clone(),
            detail_address: address.detail_address.clone(),
        }
    }
}

/// One page of a user's orders, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub pagination: Pagination,
    pub total_rows: u64,
}
