//! End-to-end planning: advisor, comparator, visualization and storage.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::calculations::ScenarioComparator;
use crate::calculations::common::financial_year;
use crate::db::{RepositoryError, TaxPlanRepository};
use crate::diagnostics::{DiagnosticReport, diagnose};
use crate::models::{
    AiRecommendationSet, ClientTaxProfile, ComparisonResult, NewTaxPlan, TaxPlan,
    VisualizationPayload,
};
use crate::recommendations::TaxAdvisor;
use crate::visualization::VisualizationBuilder;

/// Everything derived from one profile, before storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalysis {
    pub ai_recommendations: AiRecommendationSet,
    pub comparison: ComparisonResult,
    pub payload: VisualizationPayload,
    pub diagnostics: DiagnosticReport,
}

/// A stored plan with its freshly built payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub plan: TaxPlan,
    pub payload: VisualizationPayload,
    pub diagnostics: DiagnosticReport,
}

pub struct TaxPlanningService {
    advisor: TaxAdvisor,
    repository: Box<dyn TaxPlanRepository>,
    comparator: ScenarioComparator,
}

impl TaxPlanningService {
    pub fn new(
        advisor: TaxAdvisor,
        repository: Box<dyn TaxPlanRepository>,
    ) -> Self {
        Self {
            advisor,
            repository,
            comparator: ScenarioComparator::new(),
        }
    }

    pub fn repository(&self) -> &dyn TaxPlanRepository {
        self.repository.as_ref()
    }

    /// Runs the pipeline without touching storage.
    pub async fn analyze(
        &self,
        profile: &ClientTaxProfile,
        as_of: NaiveDate,
    ) -> PlanAnalysis {
        let diagnostics = diagnose(profile, as_of);
        let ai_recommendations = self.advisor.recommend(profile, as_of).await;
        let comparison =
            self.comparator
                .compare(profile, &ai_recommendations.recommendations, as_of);
        let payload =
            VisualizationBuilder::build(&comparison, &ai_recommendations.recommendations, as_of);

        debug!(
            completeness = %diagnostics.completeness_score,
            fallback = ai_recommendations.is_fallback,
            savings = %comparison.total_savings,
            "analysed profile"
        );

        PlanAnalysis {
            ai_recommendations,
            comparison,
            payload,
            diagnostics,
        }
    }

    /// Analyses `profile` and upserts the client's plan.
    pub async fn generate(
        &self,
        client_id: &str,
        profile: ClientTaxProfile,
        as_of: NaiveDate,
    ) -> Result<PlanOutcome, RepositoryError> {
        let analysis = self.analyze(&profile, as_of).await;

        let plan = self
            .repository
            .upsert_plan(NewTaxPlan {
                client_id: client_id.to_string(),
                financial_year: financial_year(as_of),
                profile,
                current_tax_liability: analysis.comparison.current.tax_liability,
                optimized_tax_liability: Some(analysis.comparison.optimized.tax_liability),
                ai_recommendations: Some(analysis.ai_recommendations),
            })
            .await?;

        info!(client_id, plan_id = plan.id, "stored tax plan");

        Ok(PlanOutcome {
            plan,
            payload: analysis.payload,
            diagnostics: analysis.diagnostics,
        })
    }

    /// Rebuilds the payload for a stored plan. A plan that never received
    /// recommendations yields an empty timeline and no savings.
    pub async fn visualize(
        &self,
        client_id: &str,
        as_of: NaiveDate,
    ) -> Result<VisualizationPayload, RepositoryError> {
        let plan = self.repository.get_plan(client_id).await?;
        let recommendations = plan
            .ai_recommendations
            .as_ref()
            .map(|set| set.recommendations.as_slice())
            .unwrap_or_default();

        let comparison = self.comparator.compare(&plan.profile, recommendations, as_of);
        Ok(VisualizationBuilder::build(&comparison, recommendations, as_of))
    }
}
