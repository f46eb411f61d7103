use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::deduction::DeductionSection;
use super::lenient;

/// The fixed set of recommendation categories accepted for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    DeductionOptimization,
    InvestmentStrategy,
    TaxSavingInstruments,
    CapitalGains,
    TimingOptimization,
    RiskManagement,
    Compliance,
}

impl RecommendationCategory {
    pub const ALL: [RecommendationCategory; 7] = [
        Self::DeductionOptimization,
        Self::InvestmentStrategy,
        Self::TaxSavingInstruments,
        Self::CapitalGains,
        Self::TimingOptimization,
        Self::RiskManagement,
        Self::Compliance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeductionOptimization => "deduction_optimization",
            Self::InvestmentStrategy => "investment_strategy",
            Self::TaxSavingInstruments => "tax_saving_instruments",
            Self::CapitalGains => "capital_gains",
            Self::TimingOptimization => "timing_optimization",
            Self::RiskManagement => "risk_management",
            Self::Compliance => "compliance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DeductionOptimization => "Deduction Optimization",
            Self::InvestmentStrategy => "Investment Strategy",
            Self::TaxSavingInstruments => "Tax Saving Instruments",
            Self::CapitalGains => "Capital Gains",
            Self::TimingOptimization => "Timing Optimization",
            Self::RiskManagement => "Risk Management",
            Self::Compliance => "Compliance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A recommendation as produced by the AI (or any other upstream source),
/// before normalisation. Category, priority and risk level are free-form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecommendation {
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(deserialize_with = "lenient::text")]
    pub priority: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::amount")]
    pub potential_savings: Decimal,
    #[serde(deserialize_with = "lenient::strings")]
    pub implementation_steps: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub deadline: String,
    #[serde(deserialize_with = "lenient::text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient::text")]
    pub section: String,
}

/// A recommendation whose category, priority and risk level conform to the
/// fixed enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub potential_savings: Decimal,
    pub implementation_steps: Vec<String>,
    pub deadline: Option<NaiveDate>,
    pub risk_level: RiskLevel,
    /// Explicit deduction section, when the source tagged one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<DeductionSection>,
}

/// The normalised AI output persisted with a client's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendationSet {
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
    pub total_potential_savings: Decimal,
    /// Between 0 and 1.
    pub confidence_score: Decimal,
    /// True when the static fallback set was substituted.
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    #[serde(default)]
    pub credit_exhausted: bool,
}
