use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::recommendation::{Priority, RecommendationCategory, RiskLevel};
use super::scenario::TaxScenario;

/// Chart-ready before/after data for the API response collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationPayload {
    pub before_after_comparison: BeforeAfterComparison,
    pub charts: Charts,
    pub implementation_timeline: Vec<TimelineItem>,
    pub summary: PayloadSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeAfterComparison {
    pub current: TaxScenario,
    pub optimized: TaxScenario,
    pub total_savings: Decimal,
    pub savings_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub tax_comparison: ChartData,
    pub deduction_utilization: ChartData,
    pub savings_by_category: ChartData,
    pub priority_distribution: ChartData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Doughnut,
    Pie,
}

/// Label/dataset structure consumed directly by the charting front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    #[default]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub potential_savings: Decimal,
    pub status: ImplementationStatus,
    pub category: RecommendationCategory,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSummary {
    pub total_recommendations: usize,
    pub high_priority_count: usize,
    /// Sum of the recommendations' stated potential savings.
    pub total_potential_savings: Decimal,
    /// Liability delta actually reflected in the optimised scenario.
    pub estimated_tax_savings: Decimal,
    pub unallocated_savings: Decimal,
    pub overall_risk_level: RiskLevel,
    pub implementation_time_months: u32,
}
