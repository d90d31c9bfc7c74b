//! Error type for the AI summary client

use thiserror::Error;

/// Text shown whenever an insight cannot be generated
pub const FALLBACK_TEXT: &str =
    "Unable to generate AI insights at this time. Please check your API Key configuration.";

/// Text shown when the endpoint answered without any text
pub const NO_ANALYSIS_TEXT: &str = "No analysis generated.";

/// Failures of a text-generation call
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key configured
    #[error("No API key configured (set GEMINI_API_KEY or API_KEY)")]
    MissingApiKey,

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried no text
    #[error("Empty response from text generation endpoint")]
    EmptyResponse,

    /// The request or response body could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    /// User-facing text that replaces the insight for this error
    pub fn fallback_text(&self) -> &'static str {
        match self {
            Self::EmptyResponse => NO_ANALYSIS_TEXT,
            _ => FALLBACK_TEXT,
        }
    }
}
