use std::path::PathBuf;

use async_trait::async_trait;
use taxplan_core::{AdvisorError, RecommendationSource};
use tracing::debug;

/// Replays a recommendation response saved to a file.
///
/// The prompt is ignored; the file holds the raw response text exactly as
/// the upstream model returned it, fenced or bare JSON alike.
pub struct FileRecommendationSource {
    path: PathBuf,
}

impl FileRecommendationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecommendationSource for FileRecommendationSource {
    async fn fetch(
        &self,
        _prompt: &str,
    ) -> Result<String, AdvisorError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AdvisorError::Transport(format!("Failed to read '{}': {}", self.path.display(), e))
        })?;

        if text.trim().is_empty() {
            return Err(AdvisorError::Empty);
        }

        debug!(path = %self.path.display(), bytes = text.len(), "read recommendation response");
        Ok(text)
    }
}
