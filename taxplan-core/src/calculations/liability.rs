//! Income tax liability under the old-regime individual slabs.
//!
//! The calculation proceeds in four steps:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Slab tax: marginal rate applied to each slice of taxable income |
//! | 2    | Section 87A rebate: up to ₹12,500 when taxable income ≤ ₹5,00,000 |
//! | 3    | Health and education cess: 4% of tax after rebate |
//! | 4    | Round to the nearest rupee |
//!
//! # Slabs by age band
//!
//! | Slice                    | Normal | Senior (60–79) | Super-senior (80+) |
//! |--------------------------|--------|----------------|--------------------|
//! | up to ₹2,50,000          | 0%     | 0%             | 0%                 |
//! | ₹2,50,000 – ₹3,00,000    | 10%    | 0%             | 0%                 |
//! | ₹3,00,000 – ₹5,00,000    | 10%    | 10%            | 0%                 |
//! | ₹5,00,000 – ₹10,00,000   | 20%    | 20%            | 20%                |
//! | above ₹10,00,000         | 30%    | 30%            | 30%                |
//!
//! The rebate applies to every band at the same ₹5,00,000 threshold.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxplan_core::AgeBand;
//! use taxplan_core::calculations::TaxLiabilityCalculator;
//!
//! let calculator = TaxLiabilityCalculator::new();
//!
//! assert_eq!(calculator.calculate(dec!(1200000), AgeBand::Normal), dec!(192400));
//! assert_eq!(calculator.calculate(dec!(400000), AgeBand::Normal), dec!(2600));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calculations::common::{max, min, percentage, round_to_rupee};
use crate::calculations::deductions::DeductionAggregator;
use crate::models::{AgeBand, ClientTaxProfile, DeductionBundle, TaxScenario};

/// One progressive bracket: `rate` applies to income above `lower` and up to
/// `upper` (unbounded when `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Slab {
    fn new(
        lower: i64,
        upper: Option<i64>,
        rate_percent: i64,
    ) -> Self {
        Self {
            lower: Decimal::from(lower),
            upper: upper.map(Decimal::from),
            rate: Decimal::new(rate_percent, 2),
        }
    }

    /// Tax due on the part of `income` that falls inside this slab.
    fn tax_on(
        &self,
        income: Decimal,
    ) -> Decimal {
        let ceiling = match self.upper {
            Some(upper) => min(income, upper),
            None => income,
        };
        max(ceiling - self.lower, Decimal::ZERO) * self.rate
    }
}

/// Calculator for individual income tax liability.
///
/// Holds no state between calls; the same inputs always produce the same
/// liability.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxLiabilityCalculator;

impl TaxLiabilityCalculator {
    /// Maximum section 87A rebate.
    pub const REBATE_LIMIT: Decimal = Decimal::from_parts(12_500, 0, 0, false, 0);
    /// Taxable income at or below which the rebate applies.
    pub const REBATE_INCOME_THRESHOLD: Decimal = Decimal::from_parts(500_000, 0, 0, false, 0);
    /// Health and education cess multiplier (1 + 4%).
    pub const CESS_MULTIPLIER: Decimal = Decimal::from_parts(104, 0, 0, false, 2);

    pub fn new() -> Self {
        Self
    }

    /// Taxable slabs for an age band, lowest first. The 0% bottom slab is
    /// implicit.
    pub fn slabs(band: AgeBand) -> Vec<Slab> {
        let upper = vec![
            Slab::new(500_000, Some(1_000_000), 20),
            Slab::new(1_000_000, None, 30),
        ];
        let ten_percent = match band {
            AgeBand::Normal => Some(Slab::new(250_000, Some(500_000), 10)),
            AgeBand::Senior => Some(Slab::new(300_000, Some(500_000), 10)),
            AgeBand::SuperSenior => None,
        };
        ten_percent.into_iter().chain(upper).collect()
    }

    /// Final liability, cess included, rounded to the rupee.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
        band: AgeBand,
    ) -> Decimal {
        let slab_tax = self.slab_tax(taxable_income, band);
        let after_rebate = self.apply_rebate(slab_tax, taxable_income);
        let liability = self.apply_cess(after_rebate);

        trace!(
            %taxable_income,
            band = band.as_str(),
            %slab_tax,
            %after_rebate,
            %liability,
            "computed tax liability"
        );

        liability
    }

    /// Builds a full [`TaxScenario`] for an income and deduction bundle.
    pub fn scenario(
        &self,
        annual_income: Decimal,
        deductions: DeductionBundle,
        band: AgeBand,
    ) -> TaxScenario {
        let taxable_income = self.taxable_income(annual_income, &deductions);
        let tax_liability = self.calculate(taxable_income, band);

        TaxScenario {
            annual_income,
            deductions,
            taxable_income,
            tax_liability,
            effective_rate: percentage(tax_liability, annual_income),
            age_band: band,
        }
    }

    /// Scenario for a profile's own declared deductions.
    pub fn current_scenario(
        &self,
        profile: &ClientTaxProfile,
        as_of: chrono::NaiveDate,
    ) -> TaxScenario {
        self.scenario(
            profile.annual_income(),
            DeductionAggregator::aggregate(profile),
            profile.age_band(as_of),
        )
    }

    /// Income minus total deductions, never negative.
    fn taxable_income(
        &self,
        annual_income: Decimal,
        deductions: &DeductionBundle,
    ) -> Decimal {
        max(annual_income - deductions.total, Decimal::ZERO)
    }

    /// Sum of marginal tax across the band's slabs.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
        band: AgeBand,
    ) -> Decimal {
        Self::slabs(band)
            .iter()
            .map(|slab| slab.tax_on(taxable_income))
            .sum()
    }

    /// Section 87A: up to the rebate limit when income is within the threshold.
    fn apply_rebate(
        &self,
        tax: Decimal,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income > Self::REBATE_INCOME_THRESHOLD {
            return tax;
        }
        let rebate = min(tax, Self::REBATE_LIMIT);
        max(tax - rebate, Decimal::ZERO)
    }

    /// Adds cess and rounds to the rupee.
    fn apply_cess(
        &self,
        tax: Decimal,
    ) -> Decimal {
        round_to_rupee(tax * Self::CESS_MULTIPLIER)
    }
}
