use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client_profile::ClientTaxProfile;
use super::recommendation::AiRecommendationSet;

/// A client's stored tax plan. One record per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxPlan {
    pub id: i64,
    pub client_id: String,
    /// Financial year label, e.g. `2025-26`.
    pub financial_year: String,
    pub profile: ClientTaxProfile,
    pub ai_recommendations: Option<AiRecommendationSet>,
    pub current_tax_liability: Decimal,
    pub optimized_tax_liability: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For upserting plans (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaxPlan {
    pub client_id: String,
    pub financial_year: String,
    pub profile: ClientTaxProfile,
    pub ai_recommendations: Option<AiRecommendationSet>,
    pub current_tax_liability: Decimal,
    pub optimized_tax_liability: Option<Decimal>,
}
