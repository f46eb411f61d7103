use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use taxplan_core::{NewTaxPlan, RepositoryError, TaxPlan, TaxPlanRepository};
use tracing::debug;

use crate::decimal::{get_decimal, get_optional_decimal};

const MEMORY: &str = ":memory:";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `database`: a file path (created when missing), a `sqlite:` URL,
    /// or `:memory:`.
    pub async fn new(database: &str) -> Result<Self> {
        let pool = if database == MEMORY || database == "sqlite::memory:" {
            // Each in-memory connection is its own database, so keep exactly one
            // alive for the life of the pool.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
        } else {
            let options = if database.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(database)
                    .with_context(|| format!("Invalid database URL: {}", database))?
            } else {
                SqliteConnectOptions::new().filename(database)
            };
            SqlitePoolOptions::new()
                .connect_with(options.create_if_missing(true))
                .await
        }
        .with_context(|| format!("Failed to connect to database: {}", database))?;

        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn to_json<T: Serialize>(
    value: &T,
    column: &str,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|e| RepositoryError::Database(format!("Failed to encode '{}': {}", column, e)))
}

fn get_json<T: DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>, RepositoryError> {
    let text: Option<String> = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))?;
    text.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            RepositoryError::Database(format!("Failed to decode '{}': {}", column, e))
        })
    })
    .transpose()
}

fn row_to_tax_plan(row: &SqliteRow) -> Result<TaxPlan, RepositoryError> {
    Ok(TaxPlan {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        client_id: row
            .try_get("client_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        financial_year: row
            .try_get("financial_year")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        profile: get_json(row, "profile")?.unwrap_or_default(),
        ai_recommendations: get_json(row, "ai_recommendations")?,
        current_tax_liability: get_decimal(row, "current_tax_liability")?,
        optimized_tax_liability: get_optional_decimal(row, "optimized_tax_liability")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

const SELECT_PLAN: &str = "SELECT id, client_id, financial_year, profile, ai_recommendations,
        current_tax_liability, optimized_tax_liability, created_at, updated_at
 FROM tax_plan";

#[async_trait]
impl TaxPlanRepository for SqliteRepository {
    async fn upsert_plan(
        &self,
        plan: NewTaxPlan,
    ) -> Result<TaxPlan, RepositoryError> {
        let now = Utc::now();
        let profile = to_json(&plan.profile, "profile")?;
        let recommendations = plan
            .ai_recommendations
            .as_ref()
            .map(|set| to_json(set, "ai_recommendations"))
            .transpose()?;

        sqlx::query(
            "INSERT INTO tax_plan (
                client_id, financial_year, profile, ai_recommendations,
                current_tax_liability, optimized_tax_liability, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (client_id) DO UPDATE SET
                financial_year = excluded.financial_year,
                profile = excluded.profile,
                ai_recommendations = excluded.ai_recommendations,
                current_tax_liability = excluded.current_tax_liability,
                optimized_tax_liability = excluded.optimized_tax_liability,
                updated_at = excluded.updated_at",
        )
        .bind(&plan.client_id)
        .bind(&plan.financial_year)
        .bind(profile)
        .bind(recommendations)
        .bind(plan.current_tax_liability.to_string())
        .bind(plan.optimized_tax_liability.map(|d| d.to_string()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(client_id = %plan.client_id, "upserted tax plan");
        self.get_plan(&plan.client_id).await
    }

    async fn get_plan(
        &self,
        client_id: &str,
    ) -> Result<TaxPlan, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PLAN} WHERE client_id = ?"))
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_tax_plan(&row)
    }

    async fn list_plans(&self) -> Result<Vec<TaxPlan>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_PLAN} ORDER BY client_id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_tax_plan).collect()
    }

    async fn delete_plan(
        &self,
        client_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_plan WHERE client_id = ?")
            .bind(client_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use taxplan_core::{AdvisorError, ClientTaxProfile, TaxAdvisor};

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new(MEMORY)
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn create_test_plan(client_id: &str) -> NewTaxPlan {
        let mut profile = ClientTaxProfile::default();
        profile.income.annual_income = dec!(1200000);
        profile.investments.section_80c.ppf = dec!(50000);
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        NewTaxPlan {
            client_id: client_id.to_string(),
            financial_year: "2025-26".to_string(),
            profile,
            ai_recommendations: Some(TaxAdvisor::fallback(as_of, &AdvisorError::Empty)),
            current_tax_liability: dec!(176800),
            optimized_tax_liability: Some(dec!(124800.50)),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_plan() {
        let repo = setup_test_db().await;
        let new_plan = create_test_plan("client-1");

        let created = repo.upsert_plan(new_plan.clone()).await.expect("Should upsert");
        let fetched = repo.get_plan("client-1").await.expect("Should find plan");

        assert_eq!(fetched, created);
        assert_eq!(fetched.profile, new_plan.profile);
        assert_eq!(fetched.ai_recommendations, new_plan.ai_recommendations);
        assert_eq!(fetched.current_tax_liability, dec!(176800));
        assert_eq!(fetched.optimized_tax_liability, Some(dec!(124800.50)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_plan() {
        let repo = setup_test_db().await;
        let first = repo.upsert_plan(create_test_plan("client-1")).await.unwrap();

        let mut update = create_test_plan("client-1");
        update.ai_recommendations = None;
        update.optimized_tax_liability = None;
        update.current_tax_liability = dec!(2600);
        let second = repo.upsert_plan(update).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.current_tax_liability, dec!(2600));
        assert_eq!(second.ai_recommendations, None);
        assert_eq!(second.optimized_tax_liability, None);
        assert_eq!(repo.list_plans().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_plan_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_plan("missing").await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_plans_ordered_by_client() {
        let repo = setup_test_db().await;
        repo.upsert_plan(create_test_plan("zeta")).await.unwrap();
        repo.upsert_plan(create_test_plan("alpha")).await.unwrap();

        let clients: Vec<_> = repo
            .list_plans()
            .await
            .unwrap()
            .into_iter()
            .map(|plan| plan.client_id)
            .collect();

        assert_eq!(clients, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_delete_plan() {
        let repo = setup_test_db().await;
        repo.upsert_plan(create_test_plan("client-1")).await.unwrap();

        repo.delete_plan("client-1").await.expect("Should delete");

        assert_eq!(repo.get_plan("client-1").await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_plan("client-1").await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.db");

        let repo = SqliteRepository::new(path.to_str().unwrap()).await.unwrap();
        repo.run_migrations().await.unwrap();
        repo.upsert_plan(create_test_plan("client-1")).await.unwrap();

        assert!(path.exists());
    }
}
