//! Fetches AI recommendations and substitutes the fallback set on failure.
//!
//! [`TaxAdvisor::recommend`] never returns an error. Any fetch, timeout or
//! parse failure yields the static fallback set with the failure recorded
//! in [`AiRecommendationSet::api_error`].

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::fallback::{FALLBACK_CONFIDENCE, FALLBACK_SUMMARY, fallback_recommendations};
use super::normalizer::RecommendationNormalizer;
use super::prompt::render_prompt;
use crate::models::{AiRecommendationSet, ClientTaxProfile, RawRecommendation, lenient};

/// Default upper bound on a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Confidence assumed when a parsed response states none.
pub const DEFAULT_CONFIDENCE: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

static FENCED_JSON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok());

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("Recommendation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Recommendation service returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Recommendation service returned no recommendations")]
    Empty,

    #[error("Malformed recommendation response: {0}")]
    Malformed(String),
}

impl AdvisorError {
    /// True when the upstream account has run out of credit.
    pub fn is_credit_exhausted(&self) -> bool {
        match self {
            Self::Status { code, body } => {
                *code == 402 || body.to_ascii_lowercase().contains("credit balance")
            }
            _ => false,
        }
    }
}

/// Anything that can answer a prompt with raw response text.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn fetch(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// Shape of the JSON object expected in a response.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdvisorResponse {
    recommendations: Vec<RawRecommendation>,
    #[serde(deserialize_with = "lenient::text")]
    summary: String,
    #[serde(deserialize_with = "lenient::optional_amount")]
    total_potential_savings: Option<Decimal>,
    #[serde(deserialize_with = "lenient::optional_amount")]
    confidence_score: Option<Decimal>,
}

pub struct TaxAdvisor {
    source: Box<dyn RecommendationSource>,
    timeout: Duration,
}

impl TaxAdvisor {
    pub fn new(source: Box<dyn RecommendationSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    /// Recommendations for `profile`, falling back to the static set on
    /// any failure.
    pub async fn recommend(
        &self,
        profile: &ClientTaxProfile,
        as_of: NaiveDate,
    ) -> AiRecommendationSet {
        let prompt = render_prompt(profile, as_of);

        match self.fetch_and_parse(&prompt).await {
            Ok(set) => {
                debug!(
                    count = set.recommendations.len(),
                    total = %set.total_potential_savings,
                    "parsed advisor recommendations"
                );
                set
            }
            Err(err) => {
                warn!(error = %err, "advisor failed, substituting fallback recommendations");
                Self::fallback(as_of, &err)
            }
        }
    }

    async fn fetch_and_parse(
        &self,
        prompt: &str,
    ) -> Result<AiRecommendationSet, AdvisorError> {
        let text = tokio::time::timeout(self.timeout, self.source.fetch(prompt))
            .await
            .map_err(|_| AdvisorError::Timeout(self.timeout))??;
        Self::parse_response(&text)
    }

    /// Parses raw response text into a normalised recommendation set.
    pub fn parse_response(text: &str) -> Result<AiRecommendationSet, AdvisorError> {
        let json = extract_json(text).ok_or(AdvisorError::Empty)?;
        let response: AdvisorResponse =
            serde_json::from_str(json).map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        if response.recommendations.is_empty() {
            return Err(AdvisorError::Empty);
        }

        let recommendations = RecommendationNormalizer::normalize_all(&response.recommendations);
        let total_potential_savings = response
            .total_potential_savings
            .unwrap_or_else(|| recommendations.iter().map(|r| r.potential_savings).sum());
        let confidence_score = response
            .confidence_score
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(Decimal::ZERO, Decimal::ONE);

        Ok(AiRecommendationSet {
            generated_at: Utc::now(),
            recommendations,
            summary: response.summary,
            total_potential_savings,
            confidence_score,
            is_fallback: false,
            api_error: None,
            credit_exhausted: false,
        })
    }

    /// The static set, tagged with the failure that caused it.
    pub fn fallback(
        as_of: NaiveDate,
        error: &AdvisorError,
    ) -> AiRecommendationSet {
        let recommendations = fallback_recommendations(as_of);
        AiRecommendationSet {
            generated_at: Utc::now(),
            total_potential_savings: recommendations.iter().map(|r| r.potential_savings).sum(),
            recommendations,
            summary: FALLBACK_SUMMARY.to_string(),
            confidence_score: FALLBACK_CONFIDENCE,
            is_fallback: true,
            api_error: Some(error.to_string()),
            credit_exhausted: error.is_credit_exhausted(),
        }
    }
}

/// First JSON object in `text`: a fenced block if present, else the span
/// from the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let fenced = FENCED_JSON
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1));
    if let Some(m) = fenced {
        return Some(m.as_str());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
