//! Wiring between the command line and the planning crates.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use taxplan_core::calculations::TaxLiabilityCalculator;
use taxplan_core::calculations::common::{max, percentage};
use taxplan_core::db::{DbConfig, RepositoryRegistry};
use taxplan_core::{
    AdvisorError, AgeBand, ClientTaxProfile, RecommendationSource, TaxAdvisor, TaxPlan,
    TaxPlanRepository,
};
use taxplan_data::{ClientProfileLoader, FileRecommendationSource};
use taxplan_db_sqlite::SqliteRepositoryFactory;
use tracing::debug;

use crate::config::AdvisorConfig;

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn TaxPlanRepository>> {
    debug!(backend = %config.backend, "connecting to plan store");
    build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                config.backend, config.connection_string
            )
        })
}

/// Stands in for the remote model when no saved response is supplied, so
/// every analysis runs on the fallback set.
pub struct OfflineSource;

#[async_trait]
impl RecommendationSource for OfflineSource {
    async fn fetch(
        &self,
        _prompt: &str,
    ) -> Result<String, AdvisorError> {
        Err(AdvisorError::Transport(
            "no recommendation source configured".to_string(),
        ))
    }
}

pub fn build_advisor(
    config: &AdvisorConfig,
    ai_response: Option<&Path>,
) -> TaxAdvisor {
    let source: Box<dyn RecommendationSource> = match ai_response {
        Some(path) => Box::new(FileRecommendationSource::new(path)),
        None => Box::new(OfflineSource),
    };
    TaxAdvisor::new(source).with_timeout(config.timeout())
}

/// Reads a `ClientTaxProfile` JSON document.
pub fn read_profile(path: &Path) -> Result<ClientTaxProfile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid profile JSON: {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityReport {
    pub annual_income: Decimal,
    pub deductions: Decimal,
    pub taxable_income: Decimal,
    pub age_band: AgeBand,
    pub tax_liability: Decimal,
    pub effective_rate: Decimal,
}

/// Liability for a bare income figure. `deductions` is taken as already
/// capped; the age band comes from `birth_year` and defaults to normal.
pub fn liability_report(
    income: Decimal,
    birth_year: Option<i32>,
    deductions: Decimal,
    as_of: NaiveDate,
) -> LiabilityReport {
    let age_band = birth_year
        .map(|year| AgeBand::from_age(as_of.year() - year))
        .unwrap_or_default();
    let taxable_income = max(income - deductions, Decimal::ZERO);
    let tax_liability = TaxLiabilityCalculator::new().calculate(taxable_income, age_band);

    LiabilityReport {
        annual_income: income,
        deductions,
        taxable_income,
        age_band,
        tax_liability,
        effective_rate: percentage(tax_liability, income),
    }
}

pub async fn load_profiles_file(
    repo: &dyn TaxPlanRepository,
    path: &Path,
    as_of: NaiveDate,
) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let records = ClientProfileLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
    debug!(count = records.len(), "parsed client profiles");

    ClientProfileLoader::load(repo, &records, as_of)
        .await
        .context("Failed to load client profiles into database")
}

/// One line of `taxplan list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub client_id: String,
    pub financial_year: String,
    pub current_tax_liability: Decimal,
    pub optimized_tax_liability: Option<Decimal>,
    pub has_recommendations: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&TaxPlan> for PlanSummary {
    fn from(plan: &TaxPlan) -> Self {
        Self {
            client_id: plan.client_id.clone(),
            financial_year: plan.financial_year.clone(),
            current_tax_liability: plan.current_tax_liability,
            optimized_tax_liability: plan.optimized_tax_liability,
            has_recommendations: plan.ai_recommendations.is_some(),
            updated_at: plan.updated_at,
        }
    }
}

pub async fn plan_summaries(repo: &dyn TaxPlanRepository) -> Result<Vec<PlanSummary>> {
    let plans = repo.list_plans().await.context("Failed to list plans")?;
    Ok(plans.iter().map(PlanSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn memory() -> DbConfig {
        DbConfig::default()
    }

    // =========================================================================
    // liability_report tests
    // =========================================================================

    #[test]
    fn liability_for_normal_band() {
        let report = liability_report(dec!(1200000), None, dec!(0), as_of());

        assert_eq!(report.taxable_income, dec!(1200000));
        assert_eq!(report.age_band, AgeBand::Normal);
        assert_eq!(report.tax_liability, dec!(192400));
        assert_eq!(report.effective_rate, dec!(16.03));
    }

    #[test]
    fn liability_uses_birth_year_band() {
        let report = liability_report(dec!(480000), Some(1940), dec!(0), as_of());

        assert_eq!(report.age_band, AgeBand::SuperSenior);
        assert_eq!(report.tax_liability, dec!(0));
    }

    #[test]
    fn deductions_beyond_income_floor_at_zero() {
        let report = liability_report(dec!(100000), None, dec!(250000), as_of());

        assert_eq!(report.taxable_income, dec!(0));
        assert_eq!(report.tax_liability, dec!(0));
    }

    // =========================================================================
    // advisor wiring tests
    // =========================================================================

    #[tokio::test]
    async fn offline_advisor_falls_back() {
        let advisor = build_advisor(&AdvisorConfig::default(), None);

        let set = advisor.recommend(&ClientTaxProfile::default(), as_of()).await;

        assert!(set.is_fallback);
        assert_eq!(set.recommendations.len(), 4);
        assert_eq!(set.total_potential_savings, dec!(70200));
    }

    #[tokio::test]
    async fn saved_response_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"recommendations": [{{"category": "deduction_optimization", "title": "Top up NPS",
                "potentialSavings": 50000, "priority": "high"}}], "summary": "ok"}}"#
        )
        .unwrap();
        let advisor = build_advisor(&AdvisorConfig::default(), Some(file.path()));

        let set = advisor.recommend(&ClientTaxProfile::default(), as_of()).await;

        assert!(!set.is_fallback);
        assert_eq!(set.recommendations[0].title, "Top up NPS");
    }

    // =========================================================================
    // profile and repository tests
    // =========================================================================

    #[test]
    fn read_profile_accepts_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"income": {{"annualIncome": "12,00,000"}}}}"#).unwrap();

        let profile = read_profile(file.path()).unwrap();

        assert_eq!(profile.annual_income(), dec!(1200000));
    }

    #[test]
    fn read_profile_reports_missing_file() {
        let err = read_profile(Path::new("/nonexistent/profile.json")).unwrap_err();

        assert!(format!("{err:#}").contains("profile.json"));
    }

    #[test]
    fn registry_offers_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = DbConfig {
            backend: "postgres".to_string(),
            ..memory()
        };

        assert!(open_repository(&config).await.is_err());
    }

    #[tokio::test]
    async fn load_then_list() {
        let repo = open_repository(&memory()).await.unwrap();
        let mut csv = tempfile::NamedTempFile::new().unwrap();
        writeln!(csv, "client_id,annual_income,ppf").unwrap();
        writeln!(csv, "B2,400000,").unwrap();
        writeln!(csv, "A1,1200000,150000").unwrap();

        let loaded = load_profiles_file(repo.as_ref(), csv.path(), as_of()).await.unwrap();
        let summaries = plan_summaries(repo.as_ref()).await.unwrap();

        assert_eq!(loaded, 2);
        let rows: Vec<_> = summaries
            .iter()
            .map(|s| (s.client_id.as_str(), s.current_tax_liability, s.has_recommendations))
            .collect();
        assert_eq!(
            rows,
            vec![("A1", dec!(145600), false), ("B2", dec!(2600), false)]
        );
    }
}
