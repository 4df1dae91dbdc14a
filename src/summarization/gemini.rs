//! Gemini `generateContent` client.

use std::time::Instant;

use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

use super::{GenerationConfig, SummarizationError, SummarizationResult, Summarizer};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Summarizer backed by the Gemini REST API.
pub struct GeminiSummarizer {
    client: Client,
    endpoint: String,
    generation: GenerationConfig,
}

impl GeminiSummarizer {
    /// Build the client from application config using the fixed generation settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> SummarizationResult<Self> {
        Self::with_generation(config, GenerationConfig::default())
    }

    /// Build the client with explicit generation settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_generation(
        config: &AppConfig,
        generation: GenerationConfig,
    ) -> SummarizationResult<Self> {
        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| SummarizationError::Client("API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SummarizationError::Client(e.to_string()))?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.as_str().trim_end_matches('/'),
            generation.model
        );

        Ok(Self {
            client,
            endpoint,
            generation,
        })
    }

    /// Full URL of the generation endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn generate(&self, conversation: &str) -> SummarizationResult<String> {
        let request = GenerateContentRequest::new(&self.generation, conversation);
        let started = Instant::now();

        debug!(
            model = self.generation.model,
            conversation_chars = conversation.chars().count(),
            "Sending summarization request"
        );

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = SummarizationError::Api(describe_api_error(status, &body));
            warn!(status = status.as_u16(), elapsed = ?started.elapsed(), "Summarization rejected: {err}");
            return Err(err);
        }

        let text = extract_text(&body)?;
        info!(
            model = self.generation.model,
            summary_chars = text.chars().count(),
            elapsed = ?started.elapsed(),
            "Summary generated"
        );
        Ok(text)
    }
}

impl Summarizer for GeminiSummarizer {
    fn summarize<'a>(&'a self, conversation: &'a str) -> BoxFuture<'a, SummarizationResult<String>> {
        Box::pin(self.generate(conversation))
    }
}

/// Render a non-success response the way the API describes it.
fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let e = envelope.error;
            let fallback = status.as_u16();
            let code = e.code.unwrap_or(fallback);
            e.status.map_or_else(
                || format!("{code}. {}", e.message),
                |s| format!("{code} {s}. {}", e.message),
            )
        }
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &str) -> SummarizationResult<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| SummarizationError::MalformedResponse(format!("failed to parse response: {e}")))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map_or_else(String::new, |r| format!(" (prompt blocked: {r})"));
        return Err(SummarizationError::MalformedResponse(format!(
            "response contained no candidates{reason}"
        )));
    };

    let parts: Vec<String> = candidate
        .content
        .map_or_else(Vec::new, |c| c.parts)
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if parts.is_empty() {
        let reason = candidate
            .finish_reason
            .map_or_else(String::new, |r| format!(" (finish reason: {r})"));
        return Err(SummarizationError::MalformedResponse(format!(
            "response contained no text{reason}"
        )));
    }

    Ok(parts.concat())
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    system_instruction: Content<'a>,
    generation_config: GenerationParams,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(config: &GenerationConfig, conversation: &'a str) -> Self {
        Self {
            contents: [Content {
                role: Some("user"),
                parts: [TextPart { text: conversation }],
            }],
            system_instruction: Content {
                role: None,
                parts: [TextPart {
                    text: config.system_instruction,
                }],
            },
            generation_config: GenerationParams {
                max_output_tokens: config.max_output_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    message: String,
    #[serde(default)]
    status: Option<String>,
}
