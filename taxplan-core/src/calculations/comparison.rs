//! Current versus optimised tax scenario.
//!
//! The optimised scenario layers the potential savings of
//! `deduction_optimization` recommendations on top of the client's declared
//! deductions. Each recommendation lands in one section bucket:
//!
//! 1. its explicit `section` tag, when present;
//! 2. otherwise a keyword match on the lower-cased title, checked in this
//!    order: `nps` / `80ccd` → 80CCD(1B), `80c` / `ppf` / `elss` → 80C,
//!    `80d` / `health` → 80D. A title matching several buckets takes the
//!    first, so "Health insurance via NPS" lands in 80CCD(1B).
//!
//! Savings that match no bucket are reported as
//! [`ComparisonResult::unallocated_savings`] and leave the optimised
//! liability unchanged.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, percentage};
use crate::calculations::deductions::DeductionAggregator;
use crate::calculations::liability::TaxLiabilityCalculator;
use crate::models::{
    ClientTaxProfile, ComparisonResult, DeductionSection, Recommendation, RecommendationCategory,
};

/// Additional deduction amounts requested per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalDeductions {
    pub section_80c: Decimal,
    pub section_80d: Decimal,
    pub section_80ccd1b: Decimal,
    pub unallocated: Decimal,
}

impl AdditionalDeductions {
    fn add(
        &mut self,
        section: Option<DeductionSection>,
        amount: Decimal,
    ) {
        match section {
            Some(DeductionSection::Section80C) => self.section_80c += amount,
            Some(DeductionSection::Section80D) => self.section_80d += amount,
            Some(DeductionSection::Section80Ccd1b) => self.section_80ccd1b += amount,
            None => self.unallocated += amount,
        }
    }
}

/// Runs the liability calculation before and after recommendations.
#[derive(Debug, Clone, Default)]
pub struct ScenarioComparator {
    calculator: TaxLiabilityCalculator,
}

impl ScenarioComparator {
    pub fn new() -> Self {
        Self {
            calculator: TaxLiabilityCalculator::new(),
        }
    }

    pub fn compare(
        &self,
        profile: &ClientTaxProfile,
        recommendations: &[Recommendation],
        as_of: NaiveDate,
    ) -> ComparisonResult {
        let current = self.calculator.current_scenario(profile, as_of);
        let additional = Self::additional_deductions(recommendations);

        let optimized_deductions = DeductionAggregator::with_additional(
            &current.deductions,
            additional.section_80c,
            additional.section_80d,
            additional.section_80ccd1b,
        );
        let optimized =
            self.calculator
                .scenario(current.annual_income, optimized_deductions, current.age_band);

        let total_savings = max(current.tax_liability - optimized.tax_liability, Decimal::ZERO);
        let savings_percentage = percentage(total_savings, current.tax_liability);

        debug!(
            current = %current.tax_liability,
            optimized = %optimized.tax_liability,
            %total_savings,
            unallocated = %additional.unallocated,
            "compared tax scenarios"
        );

        ComparisonResult {
            current,
            optimized,
            total_savings,
            savings_percentage,
            unallocated_savings: additional.unallocated,
        }
    }

    /// Buckets the potential savings of deduction recommendations by section.
    pub fn additional_deductions(recommendations: &[Recommendation]) -> AdditionalDeductions {
        recommendations
            .iter()
            .filter(|rec| rec.category == RecommendationCategory::DeductionOptimization)
            .fold(AdditionalDeductions::default(), |mut acc, rec| {
                let section = rec.section.or_else(|| Self::section_for_title(&rec.title));
                acc.add(section, rec.potential_savings);
                acc
            })
    }

    /// Keyword match on a recommendation title.
    pub fn section_for_title(title: &str) -> Option<DeductionSection> {
        let title = title.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

        if has(&["nps", "80ccd"]) {
            Some(DeductionSection::Section80Ccd1b)
        } else if has(&["80c", "ppf", "elss"]) {
            Some(DeductionSection::Section80C)
        } else if has(&["80d", "health"]) {
            Some(DeductionSection::Section80D)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Priority, RiskLevel};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn rec(
        category: RecommendationCategory,
        title: &str,
        savings: Decimal,
    ) -> Recommendation {
        Recommendation {
            category,
            priority: Priority::High,
            title: title.to_string(),
            description: String::new(),
            potential_savings: savings,
            implementation_steps: vec![],
            deadline: None,
            risk_level: RiskLevel::Low,
            section: None,
        }
    }

    fn salaried(annual: Decimal) -> ClientTaxProfile {
        let mut profile = ClientTaxProfile::default();
        profile.income.annual_income = annual;
        profile
    }

    // =========================================================================
    // section_for_title tests
    // =========================================================================

    #[test]
    fn title_keywords_map_to_sections() {
        assert_eq!(
            ScenarioComparator::section_for_title("Top up PPF"),
            Some(DeductionSection::Section80C)
        );
        assert_eq!(
            ScenarioComparator::section_for_title("Invest in ELSS funds"),
            Some(DeductionSection::Section80C)
        );
        assert_eq!(
            ScenarioComparator::section_for_title("Parents' Health Insurance"),
            Some(DeductionSection::Section80D)
        );
        assert_eq!(
            ScenarioComparator::section_for_title("Claim 80D"),
            Some(DeductionSection::Section80D)
        );
        assert_eq!(
            ScenarioComparator::section_for_title("Open NPS Tier 1"),
            Some(DeductionSection::Section80Ccd1b)
        );
    }

    #[test]
    fn eighty_ccd_title_is_not_taken_for_eighty_c() {
        assert_eq!(
            ScenarioComparator::section_for_title("Maximise 80CCD(1B)"),
            Some(DeductionSection::Section80Ccd1b)
        );
    }

    #[test]
    fn title_matching_several_buckets_takes_the_first() {
        assert_eq!(
            ScenarioComparator::section_for_title("Health insurance via NPS"),
            Some(DeductionSection::Section80Ccd1b)
        );
        assert_eq!(
            ScenarioComparator::section_for_title("PPF or health cover"),
            Some(DeductionSection::Section80C)
        );
    }

    #[test]
    fn unrelated_title_has_no_section() {
        assert_eq!(ScenarioComparator::section_for_title("Harvest LTCG"), None);
    }

    // =========================================================================
    // additional_deductions tests
    // =========================================================================

    #[test]
    fn only_deduction_optimization_recommendations_count() {
        let recs = vec![
            rec(RecommendationCategory::DeductionOptimization, "PPF", dec!(50000)),
            rec(RecommendationCategory::InvestmentStrategy, "PPF", dec!(99999)),
        ];

        let additional = ScenarioComparator::additional_deductions(&recs);

        assert_eq!(additional.section_80c, dec!(50000));
        assert_eq!(additional.unallocated, dec!(0));
    }

    #[test]
    fn explicit_section_wins_over_title() {
        let mut tagged = rec(RecommendationCategory::DeductionOptimization, "PPF", dec!(10000));
        tagged.section = Some(DeductionSection::Section80D);

        let additional = ScenarioComparator::additional_deductions(&[tagged]);

        assert_eq!(additional.section_80c, dec!(0));
        assert_eq!(additional.section_80d, dec!(10000));
    }

    #[test]
    fn unmatched_titles_are_unallocated() {
        let recs = vec![rec(
            RecommendationCategory::DeductionOptimization,
            "Restructure salary",
            dec!(20000),
        )];

        let additional = ScenarioComparator::additional_deductions(&recs);

        assert_eq!(additional.unallocated, dec!(20000));
        assert_eq!(additional.section_80c + additional.section_80d, dec!(0));
    }

    // =========================================================================
    // compare tests
    // =========================================================================

    #[test]
    fn compare_without_recommendations_has_no_savings() {
        let comparator = ScenarioComparator::new();

        let result = comparator.compare(&salaried(dec!(1200000)), &[], as_of());

        assert_eq!(result.current.tax_liability, dec!(192400));
        assert_eq!(result.optimized, result.current);
        assert_eq!(result.total_savings, dec!(0));
        assert_eq!(result.savings_percentage, dec!(0));
    }

    #[test]
    fn compare_applies_recapped_additional_deductions() {
        let comparator = ScenarioComparator::new();
        let recs = vec![
            rec(RecommendationCategory::DeductionOptimization, "Max out 80C via ELSS", dec!(200000)),
            rec(RecommendationCategory::DeductionOptimization, "Health insurance", dec!(25000)),
            rec(RecommendationCategory::DeductionOptimization, "NPS", dec!(50000)),
        ];

        let result = comparator.compare(&salaried(dec!(1200000)), &recs, as_of());

        // 1200000 - 225000 = 975000 -> 475000 * 0.2 + 25000 = 120000 * 1.04
        assert_eq!(result.optimized.deductions.total, dec!(225000));
        assert_eq!(result.optimized.taxable_income, dec!(975000));
        assert_eq!(result.optimized.tax_liability, dec!(124800));
        assert_eq!(result.total_savings, dec!(67600));
        // 67600 / 192400
        assert_eq!(result.savings_percentage, dec!(35.14));
    }

    #[test]
    fn compare_zero_current_liability_reports_zero_percent() {
        let comparator = ScenarioComparator::new();
        let recs = vec![rec(RecommendationCategory::DeductionOptimization, "PPF", dec!(50000))];

        let result = comparator.compare(&salaried(dec!(300000)), &recs, as_of());

        assert_eq!(result.current.tax_liability, dec!(0));
        assert_eq!(result.total_savings, dec!(0));
        assert_eq!(result.savings_percentage, dec!(0));
    }

    #[test]
    fn compare_reports_unallocated_savings() {
        let comparator = ScenarioComparator::new();
        let recs = vec![rec(
            RecommendationCategory::DeductionOptimization,
            "Claim HRA",
            dec!(30000),
        )];

        let result = comparator.compare(&salaried(dec!(1200000)), &recs, as_of());

        assert_eq!(result.total_savings, dec!(0));
        assert_eq!(result.unallocated_savings, dec!(30000));
    }
}
