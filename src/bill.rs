//! Bill

use std::num::TryFromIntError;

use serde::Serialize;
use thiserror::Error;

use crate::{
    benefits::{BenefitLookupError, ThresholdBenefit},
    lines::{BillLine, original_total},
    policies::{BillAccumulator, BillPolicy},
};

/// Errors raised while computing a bill.
#[derive(Debug, Error)]
pub enum BillError {
    /// A policy could not resolve its benefit.
    #[error("{policy} policy could not resolve benefits")]
    Lookup {
        /// Policy that failed.
        policy: BillPolicy,

        /// Underlying lookup failure.
        #[source]
        source: BenefitLookupError,
    },

    /// VIP rates are whole percentages between 0 and 100.
    #[error("vip rate of {0}% is above 100%")]
    InvalidVipRate(u8),

    /// Arithmetic overflowed.
    #[error("bill amount overflowed")]
    Overflow,

    /// An amount could not be converted between signed and unsigned minor units.
    #[error("bill amount out of range")]
    OutOfRange(#[from] TryFromIntError),
}

/// Price breakdown for one checkout attempt.
///
/// All amounts are minor currency units. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillInfo {
    /// `Σ quantity × unit_price` before any benefit.
    pub original_total_price: u64,

    /// Amount due after every applicable benefit. May be negative; callers decide what to do
    /// with that.
    pub total_price: i64,

    /// Money taken off by the VIP rate.
    pub vip_discount_money: u64,

    /// Coupon resolved for the user, applied or not.
    pub coupon: ThresholdBenefit,

    /// Promotional discount resolved for the user, applied or not.
    pub discount: ThresholdBenefit,

    /// Money actually taken off by the coupon.
    pub coupon_deduction: u64,

    /// Money actually taken off by the promotional discount.
    pub discount_deduction: u64,
}

impl BillInfo {
    /// Derive the totals from the lines and the benefits the chain gathered.
    ///
    /// VIP money is subtracted first, then the coupon when the original total is strictly
    /// greater than its threshold, then the promotional discount when the running total is
    /// strictly greater than its threshold.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::Overflow`] or [`BillError::OutOfRange`] if an amount cannot be
    /// represented.
    pub fn derive(lines: &[BillLine], acc: BillAccumulator) -> Result<Self, BillError> {
        let original_total_price = original_total(lines)?;
        let original = i64::try_from(original_total_price)?;

        let vip_discount_money = acc.vip_rate.discount_on(original_total_price)?;

        let mut total_price = original
            .checked_sub(i64::try_from(vip_discount_money)?)
            .ok_or(BillError::Overflow)?;

        let coupon_deduction = if acc.coupon.applies_to(original) {
            acc.coupon.discount_money
        } else {
            0
        };

        total_price = total_price
            .checked_sub(i64::try_from(coupon_deduction)?)
            .ok_or(BillError::Overflow)?;

        let discount_deduction = if acc.discount.applies_to(total_price) {
            acc.discount.discount_money
        } else {
            0
        };

        total_price = total_price
            .checked_sub(i64::try_from(discount_deduction)?)
            .ok_or(BillError::Overflow)?;

        Ok(Self {
            original_total_price,
            total_price,
            vip_discount_money,
            coupon: acc.coupon,
            discount: acc.discount,
            coupon_deduction,
            discount_deduction,
        })
    }

    /// Whether the coupon reduced the bill.
    pub fn coupon_applied(&self) -> bool {
        self.coupon_deduction > 0
    }

    /// Whether the promotional discount reduced the bill.
    pub fn discount_applied(&self) -> bool {
        self.discount_deduction > 0
    }
}
