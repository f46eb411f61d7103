//! Integration tests for profile loading and planning against SQLite.

use std::io::Write;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use taxplan_core::{TaxAdvisor, TaxPlanRepository, TaxPlanningService};
use taxplan_data::{ClientProfileLoader, FileRecommendationSource};
use taxplan_db_sqlite::SqliteRepository;

const CLIENTS_CSV: &str = include_str!("../test-data/clients.csv");

async fn setup_test_db() -> SqliteRepository {
    let repo = SqliteRepository::new(":memory:")
        .await
        .expect("Failed to create in-memory database");
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[tokio::test]
async fn test_load_all_clients() {
    let repo = setup_test_db().await;

    let records = ClientProfileLoader::parse(CLIENTS_CSV.as_bytes()).expect("Failed to parse CSV");
    let loaded = ClientProfileLoader::load(&repo, &records, as_of())
        .await
        .expect("Failed to load profiles");

    assert_eq!(loaded, 5);
    assert_eq!(repo.list_plans().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_loaded_liabilities_follow_age_bands() {
    let repo = setup_test_db().await;
    let records = ClientProfileLoader::parse(CLIENTS_CSV.as_bytes()).unwrap();
    ClientProfileLoader::load(&repo, &records, as_of()).await.unwrap();

    let liabilities: Vec<_> = repo
        .list_plans()
        .await
        .unwrap()
        .into_iter()
        .map(|plan| (plan.client_id, plan.current_tax_liability))
        .collect();

    assert_eq!(
        liabilities,
        vec![
            ("C001".to_string(), dec!(192400)),
            ("C002".to_string(), dec!(2600)),
            // Super-senior: 480000 falls entirely in the exempt slab.
            ("C003".to_string(), dec!(0)),
            // Senior, monthly income, capped 80C and 80D: taxable 520000.
            ("C004".to_string(), dec!(24960)),
            ("C005".to_string(), dec!(223600)),
        ]
    );
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let repo = setup_test_db().await;
    let records = ClientProfileLoader::parse(CLIENTS_CSV.as_bytes()).unwrap();

    ClientProfileLoader::load(&repo, &records, as_of()).await.unwrap();
    let first = repo.get_plan("C004").await.unwrap();
    ClientProfileLoader::load(&repo, &records, as_of()).await.unwrap();
    let second = repo.get_plan("C004").await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.profile, first.profile);
    assert_eq!(repo.list_plans().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_generate_plan_from_saved_response() {
    let repo = setup_test_db().await;
    let records = ClientProfileLoader::parse(CLIENTS_CSV.as_bytes()).unwrap();
    ClientProfileLoader::load(&repo, &records, as_of()).await.unwrap();
    let profile = repo.get_plan("C001").await.unwrap().profile;

    let mut response = tempfile::NamedTempFile::new().unwrap();
    write!(
        response,
        r#"```json
{{"recommendations": [
  {{"category": "tax_saving", "priority": "high", "title": "Invest in ELSS under 80C",
    "potentialSavings": 150000, "deadline": "2026-03-31", "riskLevel": "medium"}},
  {{"category": "health_insurance", "priority": "critical", "title": "Family health cover",
    "potentialSavings": 25000, "deadline": "2026-01-15", "riskLevel": "low"}}
 ], "summary": "Use your deduction headroom", "confidenceScore": 0.9}}
```"#
    )
    .unwrap();

    let service = TaxPlanningService::new(
        TaxAdvisor::new(Box::new(FileRecommendationSource::new(response.path()))),
        Box::new(repo),
    );

    let outcome = service.generate("C001", profile, as_of()).await.unwrap();

    let recommendations = outcome.plan.ai_recommendations.as_ref().unwrap();
    assert!(!recommendations.is_fallback);
    assert_eq!(recommendations.confidence_score, dec!(0.9));
    // Only the health cover is a deduction_optimization; 1200000 - 25000.
    assert_eq!(outcome.plan.optimized_tax_liability, Some(dec!(184600)));
    assert_eq!(outcome.payload.implementation_timeline[0].title, "Family health cover");
    assert_eq!(outcome.payload.summary.implementation_time_months, 10);

    let rebuilt = service.visualize("C001", as_of()).await.unwrap();
    assert_eq!(rebuilt, outcome.payload);
}

#[tokio::test]
async fn test_missing_response_file_falls_back() {
    let repo = setup_test_db().await;
    let service = TaxPlanningService::new(
        TaxAdvisor::new(Box::new(FileRecommendationSource::new("/nonexistent/ai.json"))),
        Box::new(repo),
    );

    let outcome = service
        .generate("C009", Default::default(), as_of())
        .await
        .unwrap();

    let recommendations = outcome.plan.ai_recommendations.unwrap();
    assert!(recommendations.is_fallback);
    assert!(recommendations.api_error.unwrap().contains("ai.json"));
    assert_eq!(outcome.diagnostics.completeness_score, dec!(0));
}
