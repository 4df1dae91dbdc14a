//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::summarization::{GeminiSummarizer, SummarizationResult, Summarizer};

/// Shared application state.
pub struct AppState {
    /// Summarizer used by `/summarize`.
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    /// Create state around an existing summarizer.
    #[must_use]
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Arc<Self> {
        Arc::new(Self { summarizer })
    }

    /// Create state backed by the Gemini client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> SummarizationResult<Arc<Self>> {
        let summarizer = GeminiSummarizer::new(config)?;
        Ok(Self::new(Arc::new(summarizer)))
    }
}
