//! Benefits
//!
//! Value types for the benefits a user may hold at checkout time, and the [`BenefitSource`] seam
//! the bill policies consult to resolve them.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bill::BillError, lines::BillLine};

/// A fixed-amount reduction gated by a spend threshold.
///
/// Used for both coupons and promotional discounts. A `threshold` of zero is the zero value and
/// means no benefit is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdBenefit {
    /// Identifier of the coupon or promotional discount.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Amount taken off the bill when the threshold is met, in minor units.
    pub discount_money: u64,

    /// The amount must be strictly greater than this for the benefit to apply, in minor units.
    pub threshold: u64,
}

impl ThresholdBenefit {
    /// Whether a benefit is present at all.
    pub fn is_available(&self) -> bool {
        self.threshold != 0
    }

    /// Whether the benefit applies to `amount`, comparing with strict "greater than".
    pub fn applies_to(&self, amount: i64) -> bool {
        self.is_available()
            && i64::try_from(self.threshold).is_ok_and(|threshold| amount > threshold)
    }
}

/// VIP percentage off, in whole percent (`12` is 12% off).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VipRate(u8);

impl VipRate {
    /// No VIP discount.
    pub const NONE: Self = Self(0);

    /// Create a VIP rate.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::InvalidVipRate`] when `percent` exceeds 100.
    pub fn new(percent: u8) -> Result<Self, BillError> {
        if percent > 100 {
            return Err(BillError::InvalidVipRate(percent));
        }

        Ok(Self(percent))
    }

    /// Percentage off.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Money taken off `amount` at this rate, rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::Overflow`] if the result cannot be represented.
    pub fn discount_on(self, amount: u64) -> Result<u64, BillError> {
        let applied = Decimal::from(amount)
            .checked_mul(Decimal::from(self.0))
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(BillError::Overflow)?;

        applied
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or(BillError::Overflow)
    }
}

impl TryFrom<u8> for VipRate {
    type Error = BillError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VipRate> for u8 {
    fn from(value: VipRate) -> Self {
        value.0
    }
}

impl fmt::Display for VipRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Failure to resolve benefits from wherever they are kept.
#[derive(Debug, Error)]
#[error("benefit lookup failed: {message}")]
pub struct BenefitLookupError {
    message: String,
}

impl BenefitLookupError {
    /// Create a lookup error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resolves the benefits available to a user for a set of lines.
///
/// Returning `Ok(None)` (or [`VipRate::NONE`]) means no benefit applies. Returning an error
/// aborts the whole bill calculation.
pub trait BenefitSource: fmt::Debug + Send + Sync {
    /// Coupon the user may redeem against these lines.
    ///
    /// # Errors
    ///
    /// Returns an error when the coupon store cannot be consulted.
    fn coupon(
        &self,
        user_id: i64,
        lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError>;

    /// Promotional discount applicable to these lines.
    ///
    /// # Errors
    ///
    /// Returns an error when the promotion store cannot be consulted.
    fn discount(
        &self,
        user_id: i64,
        lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError>;

    /// VIP rate for the user.
    ///
    /// # Errors
    ///
    /// Returns an error when membership cannot be determined.
    fn vip_rate(&self, user_id: i64) -> Result<VipRate, BenefitLookupError>;
}

/// A source with no benefits for anybody.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBenefits;

impl BenefitSource for NoBenefits {
    fn coupon(
        &self,
        _user_id: i64,
        _lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
        Ok(None)
    }

    fn discount(
        &self,
        _user_id: i64,
        _lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
        Ok(None)
    }

    fn vip_rate(&self, _user_id: i64) -> Result<VipRate, BenefitLookupError> {
        Ok(VipRate::NONE)
    }
}

/// The same benefits for every user, typically loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedBenefits {
    /// Coupon offered to everyone.
    pub coupon: Option<ThresholdBenefit>,

    /// Promotional discount offered to everyone.
    pub discount: Option<ThresholdBenefit>,

    /// VIP rate applied to everyone.
    pub vip_rate: VipRate,
}

impl BenefitSource for FixedBenefits {
    fn coupon(
        &self,
        _user_id: i64,
        _lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
        Ok(self.coupon.clone())
    }

    fn discount(
        &self,
        _user_id: i64,
        _lines: &[BillLine],
    ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
        Ok(self.discount.clone())
    }

    fn vip_rate(&self, _user_id: i64) -> Result<VipRate, BenefitLookupError> {
        Ok(self.vip_rate)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn benefit(discount_money: u64, threshold: u64) -> ThresholdBenefit {
        ThresholdBenefit {
            id: 1,
            name: "test".to_string(),
            discount_money,
            threshold,
        }
    }

    #[test]
    fn zero_threshold_is_unavailable() {
        let coupon = benefit(100, 0);

        assert!(!coupon.is_available());
        assert!(!coupon.applies_to(1_000_000));
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let coupon = benefit(100, 1000);

        assert!(!coupon.applies_to(1000));
        assert!(coupon.applies_to(1001));
    }

    #[test]
    fn negative_amounts_never_meet_a_threshold() {
        assert!(!benefit(100, 1).applies_to(-5));
    }

    #[test]
    fn vip_rate_rejects_more_than_one_hundred_percent() {
        assert!(matches!(VipRate::new(101), Err(BillError::InvalidVipRate(101))));
        assert!(VipRate::new(100).is_ok());
    }

    #[test]
    fn vip_discount_rounds_half_away_from_zero() -> TestResult {
        let rate = VipRate::new(12)?;

        // 1_125 * 12% = 135.0
        assert_eq!(rate.discount_on(1_125)?, 135);
        // 1_004 * 12% = 120.48
        assert_eq!(rate.discount_on(1_004)?, 120);
        // 1_046 * 12% = 125.52
        assert_eq!(rate.discount_on(1_046)?, 126);

        let half = VipRate::new(50)?;

        // 5 * 50% = 2.5 rounds up
        assert_eq!(half.discount_on(5)?, 3);
        // 7 * 50% = 3.5 rounds up
        assert_eq!(half.discount_on(7)?, 4);

        Ok(())
    }

    #[test]
    fn no_vip_rate_discounts_nothing() -> TestResult {
        assert_eq!(VipRate::NONE.discount_on(999_999)?, 0);

        Ok(())
    }

    #[test]
    fn fixed_benefits_apply_to_everyone() -> TestResult {
        let benefits = FixedBenefits {
            coupon: Some(benefit(100, 100)),
            discount: None,
            vip_rate: VipRate::new(5)?,
        };

        assert_eq!(benefits.coupon(1, &[])?, Some(benefit(100, 100)));
        assert_eq!(benefits.coupon(2, &[])?, Some(benefit(100, 100)));
        assert_eq!(benefits.discount(1, &[])?, None);
        assert_eq!(benefits.vip_rate(7)?, VipRate::new(5)?);

        Ok(())
    }
}
