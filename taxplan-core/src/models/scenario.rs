use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client_profile::AgeBand;
use super::deduction::DeductionBundle;

/// One tax computation: income, deductions and the resulting liability.
///
/// Computed fresh per request; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxScenario {
    pub annual_income: Decimal,
    pub deductions: DeductionBundle,
    pub taxable_income: Decimal,
    pub tax_liability: Decimal,
    /// Liability as a percentage of annual income, two decimal places.
    pub effective_rate: Decimal,
    pub age_band: AgeBand,
}

/// Current versus optimised scenario for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub current: TaxScenario,
    pub optimized: TaxScenario,
    pub total_savings: Decimal,
    pub savings_percentage: Decimal,
    /// Potential savings of deduction recommendations that could not be
    /// attributed to a section and so are absent from `optimized`.
    pub unallocated_savings: Decimal,
}
