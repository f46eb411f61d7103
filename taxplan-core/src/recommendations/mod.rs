//! Recommendation sourcing, normalisation and fallback substitution.

pub mod advisor;
pub mod fallback;
pub mod normalizer;
pub mod prompt;

pub use advisor::{AdvisorError, RecommendationSource, TaxAdvisor};
pub use fallback::fallback_recommendations;
pub use normalizer::RecommendationNormalizer;
pub use prompt::render_prompt;
