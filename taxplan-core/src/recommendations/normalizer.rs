//! Maps free-form recommendation fields onto the fixed enums.
//!
//! Every mapping is a total function with an explicit default arm, so any
//! string an upstream model produces yields exactly one valid value:
//!
//! | Field      | Unknown input falls back to |
//! |------------|-----------------------------|
//! | category   | `compliance`                |
//! | priority   | `medium`                    |
//! | risk level | `medium`                    |

use crate::models::{
    DeductionSection, Priority, RawRecommendation, Recommendation, RecommendationCategory,
    RiskLevel, lenient,
};

/// Normalizes raw recommendations one-to-one.
pub struct RecommendationNormalizer;

impl RecommendationNormalizer {
    pub fn normalize_all(raw: &[RawRecommendation]) -> Vec<Recommendation> {
        raw.iter().map(Self::normalize).collect()
    }

    pub fn normalize(raw: &RawRecommendation) -> Recommendation {
        Recommendation {
            category: Self::category(&raw.category),
            priority: Self::priority(&raw.priority),
            title: raw.title.trim().to_string(),
            description: raw.description.trim().to_string(),
            potential_savings: lenient::clamp_amount(raw.potential_savings),
            implementation_steps: raw
                .implementation_steps
                .iter()
                .map(|step| step.trim().to_string())
                .filter(|step| !step.is_empty())
                .collect(),
            deadline: lenient::parse_date(&raw.deadline),
            risk_level: Self::risk_level(&raw.risk_level),
            section: raw.section.parse::<DeductionSection>().ok(),
        }
    }

    pub fn category(value: &str) -> RecommendationCategory {
        use RecommendationCategory::*;

        match canonical(value).as_str() {
            "deduction_optimization" | "deduction_optimisation" | "deductions" | "deduction"
            | "health_insurance" | "tax_deductions" | "section_80c" | "section_80d"
            | "tax_planning" => DeductionOptimization,
            "investment_strategy" | "investment" | "investments" | "retirement_planning"
            | "retirement" | "wealth_creation" | "portfolio" | "asset_allocation" => {
                InvestmentStrategy
            }
            "tax_saving_instruments" | "tax_saving" | "tax_saving_investments"
            | "tax_efficient_investments" | "instruments" => TaxSavingInstruments,
            "capital_gains" | "capital_gains_planning" | "tax_loss_harvesting" => CapitalGains,
            "timing_optimization" | "timing_optimisation" | "timing" | "advance_tax" => {
                TimingOptimization
            }
            "risk_management" | "insurance" | "life_insurance" | "emergency_fund" => {
                RiskManagement
            }
            "compliance" | "data_completion" | "documentation" | "filing" | "kyc" => Compliance,
            _ => Compliance,
        }
    }

    pub fn priority(value: &str) -> Priority {
        match canonical(value).as_str() {
            "critical" | "urgent" | "high" => Priority::High,
            "medium" | "moderate" | "normal" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn risk_level(value: &str) -> RiskLevel {
        match canonical(value).as_str() {
            "critical" | "high" => RiskLevel::High,
            "medium" | "moderate" => RiskLevel::Medium,
            "low" | "none" | "minimal" => RiskLevel::Low,
            _ => RiskLevel::Medium,
        }
    }
}

/// Lower-cases, trims and turns spaces and hyphens into underscores.
fn canonical(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
