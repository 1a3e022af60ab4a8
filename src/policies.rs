//! Bill Policies
//!
//! The bill is built by running an ordered list of policies over a shared [`BillAccumulator`].
//! Each policy contributes exactly one field and knows nothing about the others; totals are
//! derived afterwards by [`BillInfo::derive`].

use std::fmt;

use smallvec::SmallVec;

use crate::{
    benefits::{BenefitSource, ThresholdBenefit, VipRate},
    bill::{BillError, BillInfo},
    lines::BillLine,
};

/// Benefits gathered so far while running the chain.
///
/// Fields a policy did not touch stay at their zero value, meaning "no benefit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillAccumulator {
    /// Coupon resolved by [`BillPolicy::Coupon`].
    pub coupon: ThresholdBenefit,

    /// Promotional discount resolved by [`BillPolicy::Discount`].
    pub discount: ThresholdBenefit,

    /// VIP rate resolved by [`BillPolicy::Vip`].
    pub vip_rate: VipRate,
}

/// Inputs shared by every policy in a run.
#[derive(Debug, Clone, Copy)]
pub struct BillContext<'a> {
    /// User the bill is for.
    pub user_id: i64,

    /// Lines being purchased.
    pub lines: &'a [BillLine],

    /// Where benefits are looked up.
    pub benefits: &'a dyn BenefitSource,
}

/// One step of the bill chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BillPolicy {
    /// Resolve a coupon the user can redeem.
    Coupon,

    /// Resolve a promotional spend-threshold discount.
    Discount,

    /// Resolve the user's VIP rate.
    Vip,
}

impl BillPolicy {
    /// Every policy, in the order they run.
    pub const ALL: [Self; 3] = [Self::Coupon, Self::Discount, Self::Vip];

    /// Policy name, used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coupon => "coupon",
            Self::Discount => "discount",
            Self::Vip => "vip",
        }
    }

    /// Populate this policy's field of `acc`.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::Lookup`] when the benefit source fails.
    pub fn apply(self, acc: &mut BillAccumulator, ctx: &BillContext<'_>) -> Result<(), BillError> {
        let lookup = |source| BillError::Lookup {
            policy: self,
            source,
        };

        match self {
            Self::Coupon => {
                acc.coupon = ctx
                    .benefits
                    .coupon(ctx.user_id, ctx.lines)
                    .map_err(lookup)?
                    .unwrap_or_default();
            }
            Self::Discount => {
                acc.discount = ctx
                    .benefits
                    .discount(ctx.user_id, ctx.lines)
                    .map_err(lookup)?
                    .unwrap_or_default();
            }
            Self::Vip => {
                acc.vip_rate = ctx.benefits.vip_rate(ctx.user_id).map_err(lookup)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for BillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of bill policies.
///
/// Policies always run coupon, then discount, then VIP, whatever order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillChain {
    policies: SmallVec<[BillPolicy; 3]>,
}

impl Default for BillChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl BillChain {
    /// Chain running every policy.
    pub fn standard() -> Self {
        Self::with_policies(BillPolicy::ALL)
    }

    /// Chain running only the given policies. Duplicates are dropped.
    pub fn with_policies(policies: impl IntoIterator<Item = BillPolicy>) -> Self {
        let mut policies: SmallVec<[BillPolicy; 3]> = policies.into_iter().collect();

        policies.sort_unstable();
        policies.dedup();

        Self { policies }
    }

    /// Policies in execution order.
    pub fn policies(&self) -> &[BillPolicy] {
        &self.policies
    }

    /// Run every policy in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first policy error; no partial accumulator escapes.
    pub fn run(&self, ctx: &BillContext<'_>) -> Result<BillAccumulator, BillError> {
        let mut acc = BillAccumulator::default();

        for policy in &self.policies {
            policy.apply(&mut acc, ctx)?;
        }

        Ok(acc)
    }

    /// Compute the bill for `lines` belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when a policy cannot resolve its benefit or the arithmetic overflows.
    pub fn calculate(
        &self,
        user_id: i64,
        lines: &[BillLine],
        benefits: &dyn BenefitSource,
    ) -> Result<BillInfo, BillError> {
        let ctx = BillContext {
            user_id,
            lines,
            benefits,
        };

        let acc = self.run(&ctx)?;

        BillInfo::derive(lines, acc)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use testresult::TestResult;

    use crate::benefits::{BenefitLookupError, FixedBenefits, NoBenefits};

    use super::*;

    /// Records the order lookups happen in.
    #[derive(Debug, Default)]
    struct RecordingBenefits {
        calls: Mutex<Vec<BillPolicy>>,
    }

    impl RecordingBenefits {
        fn record(&self, policy: BillPolicy) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(policy);
            }
        }

        fn calls(&self) -> Vec<BillPolicy> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl BenefitSource for RecordingBenefits {
        fn coupon(
            &self,
            _user_id: i64,
            _lines: &[BillLine],
        ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
            self.record(BillPolicy::Coupon);
            Ok(None)
        }

        fn discount(
            &self,
            _user_id: i64,
            _lines: &[BillLine],
        ) -> Result<Option<ThresholdBenefit>, BenefitLookupError> {
            self.record(BillPolicy::Discount);
            Ok(None)
        }

        fn vip_rate(&self, _user_id: i64) -> Result<VipRate, BenefitLookupError> {
            self.record(BillPolicy::Vip);
            Ok(VipRate::NONE)
        }
    }

    #[derive(Debug)]
    struct BrokenDiscounts;

    impl BenefitSource for BrokenDiscounts {
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
            Err(BenefitLookupError::new("promotion store unavailable"))
        }

        fn vip_rate(&self, _user_id: i64) -> Result<VipRate, BenefitLookupError> {
            Ok(VipRate::NONE)
        }
    }

    #[test]
    fn policies_run_in_fixed_order() -> TestResult {
        let benefits = RecordingBenefits::default();
        let chain =
            BillChain::with_policies([BillPolicy::Vip, BillPolicy::Coupon, BillPolicy::Discount]);

        chain.calculate(1, &[BillLine::new(1, 1, 100)], &benefits)?;

        assert_eq!(benefits.calls(), BillPolicy::ALL.to_vec());

        Ok(())
    }

    #[test]
    fn duplicate_policies_run_once() {
        let chain = BillChain::with_policies([BillPolicy::Coupon, BillPolicy::Coupon]);

        assert_eq!(chain.policies(), &[BillPolicy::Coupon]);
    }

    #[test]
    fn omitted_policies_leave_zero_values() -> TestResult {
        let benefits = FixedBenefits {
            coupon: Some(ThresholdBenefit {
                id: 3,
                name: "spring".to_string(),
                discount_money: 50,
                threshold: 10,
            }),
            discount: None,
            vip_rate: VipRate::new(10)?,
        };

        let ctx = BillContext {
            user_id: 1,
            lines: &[],
            benefits: &benefits,
        };

        let acc = BillChain::with_policies([BillPolicy::Vip]).run(&ctx)?;

        assert_eq!(acc.coupon, ThresholdBenefit::default());
        assert_eq!(acc.vip_rate, VipRate::new(10)?);

        Ok(())
    }

    #[test]
    fn failing_lookup_aborts_the_whole_chain() {
        let result =
            BillChain::standard().calculate(1, &[BillLine::new(1, 1, 100)], &BrokenDiscounts);

        assert!(
            matches!(
                result,
                Err(BillError::Lookup {
                    policy: BillPolicy::Discount,
                    ..
                })
            ),
            "expected discount lookup failure, got {result:?}"
        );
    }

    #[test]
    fn standard_chain_without_benefits_charges_the_original_total() -> TestResult {
        let bill = BillChain::default().calculate(
            1,
            &[BillLine::new(1, 2, 500), BillLine::new(2, 1, 300)],
            &NoBenefits,
        )?;

        assert_eq!(bill.original_total_price, 1300);
        assert_eq!(bill.total_price, 1300);

        Ok(())
    }
}
