//! Configuration for the text-generation endpoint
//!
//! Values start from defaults, are overridden by environment variables,
//! and finally by explicit CLI flags through the `with_*` builders.

use std::env;
use std::time::Duration;

/// Default model used for summaries
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default Generative Language API base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default HTTP timeout for a single summary request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variables consulted for the API key, in priority order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsConfig {
    /// API key, `None` when not configured
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-3-flash-preview`
    pub model: String,
    /// Base URL without a trailing slash
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl InsightsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.trim().is_empty());

        if let Ok(model) = env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }

        if let Ok(endpoint) = env::var("GEMINI_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint.trim_end_matches('/').to_string();
            }
        }

        if let Ok(timeout) = env::var("GEMINI_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }

    /// Whether an API key is available; drives the warning banner
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full `generateContent` URL for the configured model
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}
