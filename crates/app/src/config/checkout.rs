//! Checkout Config

use std::time::Duration;

use clap::Args;
use emporium::prelude::{BillError, FixedBenefits, ThresholdBenefit, VipRate};

/// Checkout deadline and the benefits offered to every user.
///
/// A threshold of zero means the coupon or discount is not offered.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// Upper bound on a checkout or cancellation, in milliseconds
    #[arg(long, env = "CHECKOUT_DEADLINE_MS", default_value_t = 5_000)]
    pub checkout_deadline_ms: u64,

    /// Coupon id recorded on orders that redeem it
    #[arg(long, env = "COUPON_ID", default_value_t = 0)]
    pub coupon_id: i64,

    /// Coupon display name
    #[arg(long, env = "COUPON_NAME", default_value = "")]
    pub coupon_name: String,

    /// Money the coupon takes off, in minor units
    #[arg(long, env = "COUPON_MONEY", default_value_t = 0)]
    pub coupon_money: u64,

    /// The original total must exceed this for the coupon to apply
    #[arg(long, env = "COUPON_THRESHOLD", default_value_t = 0)]
    pub coupon_threshold: u64,

    /// Promotional discount id recorded on orders that receive it
    #[arg(long, env = "DISCOUNT_ID", default_value_t = 0)]
    pub discount_id: i64,

    /// Promotional discount display name
    #[arg(long, env = "DISCOUNT_NAME", default_value = "")]
    pub discount_name: String,

    /// Money the promotional discount takes off, in minor units
    #[arg(long, env = "DISCOUNT_MONEY", default_value_t = 0)]
    pub discount_money: u64,

    /// The running total must exceed this for the promotional discount to apply
    #[arg(long, env = "DISCOUNT_THRESHOLD", default_value_t = 0)]
    pub discount_threshold: u64,

    /// VIP percentage off (0-100)
    #[arg(long, env = "VIP_RATE", default_value_t = 0)]
    pub vip_rate: u8,
}

impl CheckoutConfig {
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.checkout_deadline_ms)
    }

    /// Benefits offered to every user.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::InvalidVipRate`] when the VIP rate exceeds 100.
    pub fn benefits(&self) -> Result<FixedBenefits, BillError> {
        Ok(FixedBenefits {
            coupon: offered(ThresholdBenefit {
                id: self.coupon_id,
                name: self.coupon_name.clone(),
                discount_money: self.coupon_money,
                threshold: self.coupon_threshold,
            }),
            discount: offered(ThresholdBenefit {
                id: self.discount_id,
                name: self.discount_name.clone(),
                discount_money: self.discount_money,
                threshold: self.discount_threshold,
            }),
            vip_rate: VipRate::new(self.vip_rate)?,
        })
    }
}

fn offered(benefit: ThresholdBenefit) -> Option<ThresholdBenefit> {
    benefit.is_available().then_some(benefit)
}
