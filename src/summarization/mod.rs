//! Business summaries of chat transcripts via a hosted generative model.
//!
//! The conversation is sent as-is; the output contract lives entirely in the
//! fixed [`SYSTEM_INSTRUCTION`].

pub mod gemini;

pub use gemini::GeminiSummarizer;

use futures::future::BoxFuture;
use thiserror::Error;

/// Model used for every summary.
pub const MODEL: &str = "gemini-2.0-flash";

/// Exact text the model returns when there is nothing to summarize.
pub const NO_BUSINESS_SENTINEL: &str = "No business-relevant discussion identified.";

/// System prompt for business conversation summaries.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a professional business conversation analyst.

Your task is to generate a clear, structured, and detailed summary
of the provided chat conversation between two parties.

Focus ONLY on extracting and summarizing key business-relevant discussions.

Output Requirements:
- Use clear section headings
- Distinguish Party A and Party B
- Separate agreed vs proposed terms
- Identify unresolved issues
- Preserve exact financial figures
- Be concise but complete
- If no business discussion exists, say:
  "No business-relevant discussion identified.""#;

/// Fixed generation settings sent with every request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Model identifier.
    pub model: &'static str,
    /// System-level directive, sent separately from the conversation.
    pub system_instruction: &'static str,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
}

/// The one configuration used in production.
pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    model: MODEL,
    system_instruction: SYSTEM_INSTRUCTION,
    max_output_tokens: 1000,
    temperature: 0.3,
    top_p: 0.8,
};

impl Default for GenerationConfig {
    fn default() -> Self {
        GENERATION_CONFIG
    }
}

/// Failure of a summarization call.
///
/// Every upstream failure collapses into this one type; the display text is
/// what callers see as the error detail.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Transport failure: connect, TLS, timeout, or reading the body.
    #[error("{0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("{0}")]
    Api(String),
    /// The API answered 2xx but the payload was unusable.
    #[error("{0}")]
    MalformedResponse(String),
    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for SummarizationError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so the query string never leaks into error text.
        Self::Transport(err.without_url().to_string())
    }
}

/// Convenience result alias for summarization.
pub type SummarizationResult<T> = Result<T, SummarizationError>;

/// Turns a conversation into a summary.
pub trait Summarizer: Send + Sync {
    /// Summarize one conversation with a single upstream call.
    ///
    /// # Errors
    /// Returns an error if the upstream call fails for any reason.
    fn summarize<'a>(&'a self, conversation: &'a str) -> BoxFuture<'a, SummarizationResult<String>>;
}
