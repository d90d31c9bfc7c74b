//! Text-generation client and dashboard analysis
//!
//! `GeminiClient` talks to the Generative Language `generateContent`
//! endpoint. `InsightClient` turns a service collection into a prompt, sends
//! it through any [`TextGenerator`], and returns the text or an [`AiError`].
//! Callers substitute the fallback with [`insight_or_fallback`].

use crate::config::InsightsConfig;
use crate::error::AiError;
use crate::summary::{build_prompt, summarize};
use apicontrol_core::types::ServiceData;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
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

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    config: InsightsConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: InsightsConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("apicontrol/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.config.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = self.config.generate_url();
        debug!("Requesting summary from {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        parsed.text().ok_or(AiError::EmptyResponse)
    }
}

/// Produces dashboard summaries through a text generator
#[derive(Clone)]
pub struct InsightClient {
    generator: Arc<dyn TextGenerator>,
}

impl InsightClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Convenience constructor for the Gemini backend
    pub fn gemini(config: InsightsConfig) -> Result<Self, AiError> {
        Ok(Self::new(Arc::new(GeminiClient::new(config)?)))
    }

    /// Summarize the services and ask the generator for an analysis
    pub async fn analyze(&self, services: &[ServiceData]) -> Result<String, AiError> {
        let prompt = build_prompt(&summarize(services))?;
        let text = self.generator.generate(&prompt).await?;
        info!("Generated insight ({} chars)", text.len());
        Ok(text)
    }
}

/// Replace a failed analysis with its fallback text, logging the error
///
/// # Examples
/// ```
/// use apicontrol_insights::{AiError, FALLBACK_TEXT, insight_or_fallback};
///
/// assert_eq!(insight_or_fallback(Ok("ok".to_string())), "ok");
/// assert_eq!(insight_or_fallback(Err(AiError::MissingApiKey)), FALLBACK_TEXT);
/// ```
pub fn insight_or_fallback(result: Result<String, AiError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            error!("AI analysis failed: {}", e);
            e.fallback_text().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FALLBACK_TEXT, NO_ANALYSIS_TEXT};
    use std::sync::Mutex;

    struct RecordingGenerator {
        reply: fn() -> Result<String, AiError>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            (self.reply)()
        }
    }

    #[tokio::test]
    async fn test_analyze_sends_one_prompt() {
        let generator = Arc::new(RecordingGenerator {
            reply: || Ok("**Cost Efficiency: 8/10**".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let client = InsightClient::new(generator.clone());

        let text = client.analyze(&[]).await.unwrap();
        assert_eq!(text, "**Cost Efficiency: 8/10**");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prompt_embeds_service_summary() {
        let generator = Arc::new(RecordingGenerator {
            reply: || Ok("ok".to_string()),
            prompts: Mutex::new(Vec::new()),
        });
        let client = InsightClient::new(generator.clone());

        tokio_test::assert_ok!(tokio_test::block_on(client.analyze(&[])));
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("FinOps"));
        assert!(prompts[0].contains("[]"));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let client = GeminiClient::new(InsightsConfig::default()).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_empty_reply_maps_to_no_analysis_text() {
        let client = InsightClient::new(Arc::new(RecordingGenerator {
            reply: || Err(AiError::EmptyResponse),
            prompts: Mutex::new(Vec::new()),
        }));
        let text = insight_or_fallback(client.analyze(&[]).await);
        assert_eq!(text, NO_ANALYSIS_TEXT);
    }

    #[test]
    fn test_fallback_for_status_error() {
        let result = Err(AiError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        });
        assert_eq!(insight_or_fallback(result), FALLBACK_TEXT);
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Hello world"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);

        let blank: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert_eq!(blank.text(), None);
    }
}
