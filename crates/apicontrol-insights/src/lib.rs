//! Generative AI summaries for apicontrol
//!
//! Builds a condensed summary of the tracked services, embeds it in an
//! analyst prompt, and sends it to a text-generation endpoint. Failures are
//! returned as [`AiError`] values; the dashboard replaces them with a static
//! fallback text through [`insight_or_fallback`].

pub mod client;
pub mod config;
pub mod error;
pub mod summary;

#[cfg(test)]
pub mod test_utils;

pub use client::{GeminiClient, InsightClient, TextGenerator, insight_or_fallback};
pub use config::InsightsConfig;
pub use error::{AiError, FALLBACK_TEXT, NO_ANALYSIS_TEXT};
