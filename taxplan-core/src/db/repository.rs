use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTaxPlan, TaxPlan};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for client tax plans, one record per client.
#[async_trait]
pub trait TaxPlanRepository: Send + Sync {
    /// Inserts a plan, or replaces the existing plan for the same client.
    /// The original id and `created_at` survive a replace.
    async fn upsert_plan(&self, plan: NewTaxPlan) -> Result<TaxPlan, RepositoryError>;

    async fn get_plan(&self, client_id: &str) -> Result<TaxPlan, RepositoryError>;

    /// All plans, ordered by client id.
    async fn list_plans(&self) -> Result<Vec<TaxPlan>, RepositoryError>;

    async fn delete_plan(&self, client_id: &str) -> Result<(), RepositoryError>;
}
