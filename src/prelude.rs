//! Emporium prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    benefits::{
        BenefitLookupError, BenefitSource, FixedBenefits, NoBenefits, ThresholdBenefit, VipRate,
    },
    bill::{BillError, BillInfo},
    lines::{BillLine, original_total},
    policies::{BillAccumulator, BillChain, BillContext, BillPolicy},
};
