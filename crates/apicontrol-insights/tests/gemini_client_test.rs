//! HTTP-level tests for the Gemini client against a mock server

use apicontrol_core::types::{DailyDate, DailyUsage, Provider, ServiceData, ServiceId, ServiceStatus};
use apicontrol_insights::{
    AiError, FALLBACK_TEXT, GeminiClient, InsightClient, InsightsConfig, NO_ANALYSIS_TEXT,
    TextGenerator, insight_or_fallback,
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/test-model:generateContent";

fn config_for(server: &MockServer) -> InsightsConfig {
    InsightsConfig::default()
        .with_api_key(Some("test-key".to_string()))
        .with_model(Some("test-model".to_string()))
        .with_endpoint(Some(server.uri()))
        .with_timeout(Some(Duration::from_secs(5)))
}

fn sample_services() -> Vec<ServiceData> {
    let history = (1..=3)
        .map(|day| DailyUsage {
            date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 6, day).unwrap()),
            requests: 5_000,
            cost: 5.5,
            errors: 20,
        })
        .collect();
    vec![ServiceData::new(
        ServiceId::new("openai"),
        "OpenAI (GPT-4o)",
        Provider::OpenAI,
        ServiceStatus::Healthy,
        history,
        "#10a37f",
    )]
}

#[tokio::test]
async fn test_successful_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("OpenAI (GPT-4o)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "**Cost Efficiency:** 7/10"}]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = InsightClient::gemini(config_for(&server)).unwrap();
    let text = client.analyze(&sample_services()).await.unwrap();
    assert_eq!(text, "**Cost Efficiency:** 7/10");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(config_for(&server)).unwrap();
    let err = client.generate("prompt").await.unwrap_err();
    match err {
        AiError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "API key not valid");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_candidates_use_no_analysis_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = InsightClient::gemini(config_for(&server)).unwrap();
    let result = client.analyze(&sample_services()).await;
    assert!(matches!(result, Err(AiError::EmptyResponse)));
    assert_eq!(insight_or_fallback(result), NO_ANALYSIS_TEXT);
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = InsightClient::gemini(config_for(&server)).unwrap();
    let result = client.analyze(&sample_services()).await;
    assert!(matches!(result, Err(AiError::Json(_))));
    assert_eq!(insight_or_fallback(result), FALLBACK_TEXT);
}

#[tokio::test]
async fn test_network_failure_returns_fallback() {
    // Nothing listens on port 1
    let config = InsightsConfig::default()
        .with_api_key(Some("test-key".to_string()))
        .with_endpoint(Some("http://127.0.0.1:1".to_string()))
        .with_timeout(Some(Duration::from_secs(2)));

    let client = InsightClient::gemini(config).unwrap();
    let result = client.analyze(&sample_services()).await;
    assert!(matches!(result, Err(AiError::Network(_))));
    assert_eq!(insight_or_fallback(result), FALLBACK_TEXT);
}

#[tokio::test]
async fn test_missing_key_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = InsightsConfig {
        api_key: None,
        ..config_for(&server)
    };
    let client = InsightClient::new(Arc::new(GeminiClient::new(config).unwrap()));
    let text = insight_or_fallback(client.analyze(&sample_services()).await);
    assert_eq!(text, FALLBACK_TEXT);
}
