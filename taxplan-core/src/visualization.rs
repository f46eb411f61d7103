//! Chart-ready payload built from a comparison and its recommendations.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::common::months_until;
use crate::calculations::deductions::DeductionAggregator;
use crate::models::{
    BeforeAfterComparison, ChartData, ChartKind, Charts, ComparisonResult, Dataset,
    ImplementationStatus, PayloadSummary, Priority, Recommendation, RecommendationCategory,
    RiskLevel, TimelineItem, VisualizationPayload,
};

/// Shapes comparator output for the front end.
pub struct VisualizationBuilder;

impl VisualizationBuilder {
    pub fn build(
        comparison: &ComparisonResult,
        recommendations: &[Recommendation],
        as_of: NaiveDate,
    ) -> VisualizationPayload {
        let implementation_timeline = Self::timeline(recommendations);

        VisualizationPayload {
            before_after_comparison: BeforeAfterComparison {
                current: comparison.current.clone(),
                optimized: comparison.optimized.clone(),
                total_savings: comparison.total_savings,
                savings_percentage: comparison.savings_percentage,
            },
            charts: Charts {
                tax_comparison: Self::tax_comparison(comparison),
                deduction_utilization: Self::deduction_utilization(comparison),
                savings_by_category: Self::savings_by_category(recommendations),
                priority_distribution: Self::priority_distribution(recommendations),
            },
            summary: Self::summary(comparison, recommendations, as_of),
            implementation_timeline,
        }
    }

    fn tax_comparison(comparison: &ComparisonResult) -> ChartData {
        let (current, optimized) = (&comparison.current, &comparison.optimized);
        ChartData {
            kind: ChartKind::Bar,
            labels: vec!["Current".to_string(), "Optimized".to_string()],
            datasets: vec![
                Dataset {
                    label: "Taxable Income".to_string(),
                    data: vec![current.taxable_income, optimized.taxable_income],
                },
                Dataset {
                    label: "Tax Liability".to_string(),
                    data: vec![current.tax_liability, optimized.tax_liability],
                },
            ],
        }
    }

    fn deduction_utilization(comparison: &ComparisonResult) -> ChartData {
        let utilization = DeductionAggregator::utilization(&comparison.optimized.deductions);
        ChartData {
            kind: ChartKind::Bar,
            labels: utilization
                .iter()
                .map(|u| u.section.label().to_string())
                .collect(),
            datasets: vec![
                Dataset {
                    label: "Claimed".to_string(),
                    data: utilization.iter().map(|u| u.claimed).collect(),
                },
                Dataset {
                    label: "Limit".to_string(),
                    data: utilization.iter().map(|u| u.limit).collect(),
                },
            ],
        }
    }

    fn savings_by_category(recommendations: &[Recommendation]) -> ChartData {
        let mut by_category: BTreeMap<RecommendationCategory, Decimal> = BTreeMap::new();
        for rec in recommendations {
            *by_category.entry(rec.category).or_default() += rec.potential_savings;
        }

        ChartData {
            kind: ChartKind::Doughnut,
            labels: by_category.keys().map(|c| c.label().to_string()).collect(),
            datasets: vec![Dataset {
                label: "Potential Savings".to_string(),
                data: by_category.into_values().collect(),
            }],
        }
    }

    fn priority_distribution(recommendations: &[Recommendation]) -> ChartData {
        let counts = Priority::ALL.map(|priority| {
            let count = recommendations
                .iter()
                .filter(|rec| rec.priority == priority)
                .count();
            Decimal::from(count)
        });

        ChartData {
            kind: ChartKind::Pie,
            labels: vec!["High".to_string(), "Medium".to_string(), "Low".to_string()],
            datasets: vec![Dataset {
                label: "Recommendations".to_string(),
                data: counts.to_vec(),
            }],
        }
    }

    /// Timeline items ordered by deadline, earliest first. Items without a
    /// deadline keep their relative order at the end.
    pub fn timeline(recommendations: &[Recommendation]) -> Vec<TimelineItem> {
        let mut items: Vec<TimelineItem> = recommendations
            .iter()
            .map(|rec| TimelineItem {
                title: rec.title.clone(),
                description: rec.description.clone(),
                priority: rec.priority,
                deadline: rec.deadline,
                potential_savings: rec.potential_savings,
                status: ImplementationStatus::Pending,
                category: rec.category,
                risk_level: rec.risk_level,
            })
            .collect();
        items.sort_by_key(|item| (item.deadline.is_none(), item.deadline));
        items
    }

    /// High if any item is high, else medium if any is medium, else low.
    pub fn overall_risk(recommendations: &[Recommendation]) -> RiskLevel {
        let has = |level: RiskLevel| recommendations.iter().any(|rec| rec.risk_level == level);

        if has(RiskLevel::High) {
            RiskLevel::High
        } else if has(RiskLevel::Medium) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Months from `as_of` to the latest deadline, at least one.
    pub fn implementation_months(
        recommendations: &[Recommendation],
        as_of: NaiveDate,
    ) -> u32 {
        recommendations
            .iter()
            .filter_map(|rec| rec.deadline)
            .map(|deadline| months_until(as_of, deadline))
            .max()
            .unwrap_or(0)
            .max(1)
    }

    fn summary(
        comparison: &ComparisonResult,
        recommendations: &[Recommendation],
        as_of: NaiveDate,
    ) -> PayloadSummary {
        PayloadSummary {
            total_recommendations: recommendations.len(),
            high_priority_count: recommendations
                .iter()
                .filter(|rec| rec.priority == Priority::High)
                .count(),
            total_potential_savings: recommendations.iter().map(|rec| rec.potential_savings).sum(),
            estimated_tax_savings: comparison.total_savings,
            unallocated_savings: comparison.unallocated_savings,
            overall_risk_level: Self::overall_risk(recommendations),
            implementation_time_months: Self::implementation_months(recommendations, as_of),
        }
    }
}
