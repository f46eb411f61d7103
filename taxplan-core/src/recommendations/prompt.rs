//! Instruction text sent to the recommendation source.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::calculations::common::financial_year;
use crate::calculations::{DeductionAggregator, TaxLiabilityCalculator};
use crate::models::{ClientTaxProfile, RecommendationCategory};

/// Renders the advisor prompt for a profile.
///
/// The prompt carries the client's figures, current deduction headroom and
/// the JSON shape the response must follow.
pub fn render_prompt(
    profile: &ClientTaxProfile,
    as_of: NaiveDate,
) -> String {
    let scenario = TaxLiabilityCalculator::new().current_scenario(profile, as_of);
    let age = profile
        .age(as_of)
        .map_or_else(|| "unknown".to_string(), |age| age.to_string());

    let mut prompt = String::new();
    // Writing to a String never fails.
    let _ = writeln!(
        prompt,
        "You are an Indian tax planning advisor. Suggest old-regime tax-saving \
         recommendations for financial year {}.",
        financial_year(as_of)
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Client profile:");
    let _ = writeln!(prompt, "- Age: {age} ({})", scenario.age_band.as_str());
    let _ = writeln!(
        prompt,
        "- Marital status: {:?}, dependents: {}",
        profile.personal_info.marital_status, profile.personal_info.number_of_dependents
    );
    let _ = writeln!(
        prompt,
        "- Income type: {}, annual income: ₹{}",
        profile.income.income_type, scenario.annual_income
    );
    let _ = writeln!(prompt, "- Taxable income: ₹{}", scenario.taxable_income);
    let _ = writeln!(prompt, "- Current tax liability: ₹{}", scenario.tax_liability);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Deduction usage:");
    for usage in DeductionAggregator::utilization(&scenario.deductions) {
        let _ = writeln!(
            prompt,
            "- {}: ₹{} of ₹{} used, ₹{} remaining",
            usage.section.label(),
            usage.claimed,
            usage.limit,
            usage.remaining
        );
    }
    let _ = writeln!(prompt);

    let categories: Vec<&str> = RecommendationCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect();
    let _ = writeln!(
        prompt,
        "Respond with a single JSON object and nothing else:\n\
         {{\"recommendations\": [{{\"category\": one of [{}], \
         \"priority\": \"high\"|\"medium\"|\"low\", \"title\": string, \
         \"description\": string, \"potentialSavings\": number, \
         \"implementationSteps\": [string], \"deadline\": \"YYYY-MM-DD\", \
         \"riskLevel\": \"high\"|\"medium\"|\"low\", \
         \"section\": \"80C\"|\"80D\"|\"80CCD1B\"|null}}], \
         \"summary\": string, \"totalPotentialSavings\": number, \
         \"confidenceScore\": number between 0 and 1}}",
        categories.join(", ")
    );

    prompt
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn prompt_includes_figures_and_schema() {
        let mut profile = ClientTaxProfile::default();
        profile.income.annual_income = dec!(1200000);
        profile.investments.section_80c.ppf = dec!(50000);

        let prompt = render_prompt(&profile, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        assert!(prompt.contains("financial year 2025-26"));
        assert!(prompt.contains("Age: unknown (normal)"));
        assert!(prompt.contains("annual income: ₹1200000"));
        assert!(prompt.contains("Section 80C: ₹50000 of ₹150000 used, ₹100000 remaining"));
        assert!(prompt.contains("deduction_optimization"));
        assert!(prompt.contains("\"confidenceScore\""));
    }
}
