//! Deduction aggregation for sections 80C, 80D and 80CCD(1B).
//!
//! | Section    | Components                                                  | Cap      |
//! |------------|-------------------------------------------------------------|----------|
//! | 80C        | PPF, EPF, ELSS, NSC, life insurance, tuition, home-loan principal | ₹150,000 |
//! | 80D        | Health insurance: self/family, parents, senior citizen     | ₹25,000  |
//! | 80CCD(1B)  | Additional NPS contribution                                 | ₹50,000  |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxplan_core::ClientTaxProfile;
//! use taxplan_core::calculations::DeductionAggregator;
//!
//! let mut profile = ClientTaxProfile::default();
//! profile.investments.section_80c.ppf = dec!(400000);
//! profile.investments.section_80c.elss = dec!(100000);
//! profile.investments.section_80ccd1b.nps_additional = dec!(20000);
//!
//! let bundle = DeductionAggregator::aggregate(&profile);
//!
//! assert_eq!(bundle.section_80c, dec!(150000));
//! assert_eq!(bundle.section_80ccd1b, dec!(20000));
//! assert_eq!(bundle.total, dec!(170000));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{max, min, percentage};
use crate::models::{ClientTaxProfile, DeductionBundle, DeductionSection, DeductionUtilization};

/// Sums raw investment fields into capped section totals.
pub struct DeductionAggregator;

impl DeductionAggregator {
    /// Builds the capped [`DeductionBundle`] for a profile.
    pub fn aggregate(profile: &ClientTaxProfile) -> DeductionBundle {
        let investments = &profile.investments;
        Self::capped(
            investments.section_80c.raw_total(),
            investments.section_80d.raw_total(),
            investments.section_80ccd1b.nps_additional,
        )
    }

    /// Caps each raw section sum at its statutory limit and totals them.
    pub fn capped(
        raw_80c: Decimal,
        raw_80d: Decimal,
        raw_80ccd1b: Decimal,
    ) -> DeductionBundle {
        let section_80c = min(raw_80c, DeductionSection::Section80C.limit());
        let section_80d = min(raw_80d, DeductionSection::Section80D.limit());
        let section_80ccd1b = min(raw_80ccd1b, DeductionSection::Section80Ccd1b.limit());

        DeductionBundle {
            section_80c,
            section_80d,
            section_80ccd1b,
            total: section_80c + section_80d + section_80ccd1b,
        }
    }

    /// Adds further amounts on top of an existing bundle, re-capping each
    /// section.
    pub fn with_additional(
        bundle: &DeductionBundle,
        additional_80c: Decimal,
        additional_80d: Decimal,
        additional_80ccd1b: Decimal,
    ) -> DeductionBundle {
        Self::capped(
            bundle.section_80c + additional_80c,
            bundle.section_80d + additional_80d,
            bundle.section_80ccd1b + additional_80ccd1b,
        )
    }

    /// Per-section view of how much of each cap is in use.
    pub fn utilization(bundle: &DeductionBundle) -> Vec<DeductionUtilization> {
        DeductionSection::ALL
            .iter()
            .map(|&section| {
                let limit = section.limit();
                let claimed = bundle.get(section);
                DeductionUtilization {
                    section,
                    claimed,
                    limit,
                    remaining: max(limit - claimed, Decimal::ZERO),
                    utilization_percentage: percentage(claimed, limit),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn full_profile() -> ClientTaxProfile {
        let mut profile = ClientTaxProfile::default();
        let c = &mut profile.investments.section_80c;
        c.ppf = dec!(150000);
        c.epf = dec!(120000);
        c.elss = dec!(100000);
        c.nsc = dec!(50000);
        c.life_insurance = dec!(40000);
        c.tuition_fees = dec!(30000);
        c.principal_repayment = dec!(10000);
        let d = &mut profile.investments.section_80d;
        d.self_family = dec!(25000);
        d.parents = dec!(50000);
        d.senior_citizen = dec!(50000);
        profile.investments.section_80ccd1b.nps_additional = dec!(200000);
        profile
    }

    #[test]
    fn empty_profile_has_no_deductions() {
        let bundle = DeductionAggregator::aggregate(&ClientTaxProfile::default());

        assert_eq!(bundle, DeductionBundle::default());
    }

    #[test]
    fn large_inputs_are_capped_per_section() {
        let bundle = DeductionAggregator::aggregate(&full_profile());

        assert_eq!(bundle.section_80c, dec!(150000));
        assert_eq!(bundle.section_80d, dec!(25000));
        assert_eq!(bundle.section_80ccd1b, dec!(50000));
        assert_eq!(bundle.total, dec!(225000));
    }

    #[test]
    fn section_80c_sums_every_component() {
        let mut profile = ClientTaxProfile::default();
        let c = &mut profile.investments.section_80c;
        c.ppf = dec!(10000);
        c.epf = dec!(20000);
        c.elss = dec!(5000);
        c.nsc = dec!(1000);
        c.life_insurance = dec!(2000);
        c.tuition_fees = dec!(3000);
        c.principal_repayment = dec!(4000);

        let bundle = DeductionAggregator::aggregate(&profile);

        assert_eq!(bundle.section_80c, dec!(45000));
        assert_eq!(bundle.total, dec!(45000));
    }

    #[test]
    fn eighty_c_sum_of_500000_caps_at_150000() {
        let bundle = DeductionAggregator::capped(dec!(500000), dec!(0), dec!(0));

        assert_eq!(bundle.section_80c, dec!(150000));
    }

    #[test]
    fn caps_hold_across_magnitudes() {
        for raw in [dec!(0), dec!(1), dec!(24999), dec!(25000), dec!(1000000000)] {
            let bundle = DeductionAggregator::capped(raw, raw, raw);
            assert!(bundle.section_80c <= dec!(150000));
            assert!(bundle.section_80d <= dec!(25000));
            assert!(bundle.section_80ccd1b <= dec!(50000));
            assert_eq!(
                bundle.total,
                bundle.section_80c + bundle.section_80d + bundle.section_80ccd1b
            );
        }
    }

    #[test]
    fn additional_deductions_are_recapped() {
        let current = DeductionAggregator::capped(dec!(140000), dec!(5000), dec!(0));

        let optimized =
            DeductionAggregator::with_additional(&current, dec!(50000), dec!(10000), dec!(60000));

        assert_eq!(optimized.section_80c, dec!(150000));
        assert_eq!(optimized.section_80d, dec!(15000));
        assert_eq!(optimized.section_80ccd1b, dec!(50000));
        assert_eq!(optimized.total, dec!(215000));
    }

    #[test]
    fn utilization_reports_remaining_headroom() {
        let bundle = DeductionAggregator::capped(dec!(75000), dec!(25000), dec!(0));

        let utilization = DeductionAggregator::utilization(&bundle);

        assert_eq!(utilization.len(), 3);
        assert_eq!(utilization[0].section, DeductionSection::Section80C);
        assert_eq!(utilization[0].remaining, dec!(75000));
        assert_eq!(utilization[0].utilization_percentage, dec!(50.00));
        assert_eq!(utilization[1].remaining, dec!(0));
        assert_eq!(utilization[1].utilization_percentage, dec!(100.00));
        assert_eq!(utilization[2].claimed, dec!(0));
        assert_eq!(utilization[2].remaining, dec!(50000));
    }
}
