//! OpenAI-compatible provider implementation.
//!
//! Works with the HuggingFace inference router, Groq, and any other
//! endpoint exposing `/chat/completions`. Non-streaming only — the wire
//! contract pins `stream: false`.
//!
//! Failure classification happens here: a 503 or an error message
//! mentioning "loading" means the remote model is still warming up
//! (transient); everything else is permanent for this call.

use async_trait::async_trait;
use ragline_core::error::ProviderError;
use ragline_core::provider::{Provider, ProviderRequest, ProviderResponse};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
            client: build_client(DEFAULT_CALL_TIMEOUT),
        }
    }

    /// Replace the per-call HTTP timeout. Keep this aligned with the
    /// orchestrator's call bound so the reported timeout matches the one
    /// that actually fired.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    /// Create a HuggingFace router provider (convenience constructor).
    pub fn huggingface(api_key: impl Into<String>) -> Self {
        Self::new(
            "huggingface",
            "https://router.huggingface.co/hf-inference/v1",
            api_key,
        )
    }

    /// Create a Groq provider (convenience constructor).
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", "https://api.groq.com/openai/v1", api_key)
    }

    /// Pull a human-readable message out of a provider error body.
    ///
    /// Accepts `{"error": {"message": "..."}}`, `{"error": "..."}`, or raw
    /// text.
    fn error_message(body: &str) -> String {
        #[derive(Deserialize)]
        struct Envelope {
            error: ErrorField,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ErrorField {
            Detailed { message: String },
            Plain(String),
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(env) => match env.error {
                ErrorField::Detailed { message } => message,
                ErrorField::Plain(message) => message,
            },
            Err(_) => body.to_string(),
        }
    }

    /// Classify a non-success response: model-loading signal vs permanent.
    fn classify_failure(&self, model: &str, status: u16, body: &str) -> ProviderError {
        let message = Self::error_message(body);
        if status == 503 || message.to_lowercase().contains("loading") {
            return ProviderError::ModelLoading {
                model: model.to_string(),
            };
        }
        ProviderError::Api {
            provider: self.name.clone(),
            status_code: status,
            message,
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": false,
        });

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        provider: self.name.clone(),
                        after_secs: self.timeout.as_secs(),
                    }
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
            return Err(self.classify_failure(&request.model, status, &error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::Api {
                provider: self.name.clone(),
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        // Empty or absent completion content is an empty string, not an error
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        Ok(ProviderResponse {
            content,
            model: api_response.model.unwrap_or(request.model),
        })
    }
}

// --- OpenAI API response types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huggingface_constructor() {
        let provider = OpenAiCompatProvider::huggingface("hf-test");
        assert_eq!(provider.name(), "huggingface");
        assert!(provider.base_url.contains("router.huggingface.co"));
    }

    #[test]
    fn groq_constructor() {
        let provider = OpenAiCompatProvider::groq("gsk-test");
        assert_eq!(provider.name(), "groq");
        assert!(provider.base_url.contains("api.groq.com"));
    }

    #[test]
    fn configured_timeout_replaces_the_default() {
        let provider = OpenAiCompatProvider::groq("gsk-test");
        assert_eq!(provider.timeout, DEFAULT_CALL_TIMEOUT);

        let provider = provider.with_timeout(Duration::from_secs(300));
        assert_eq!(provider.timeout.as_secs(), 300);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let provider = OpenAiCompatProvider::new("custom", "https://llm.example.com/v1/", "key");
        assert_eq!(provider.base_url, "https://llm.example.com/v1");
    }

    #[test]
    fn error_message_from_detailed_envelope() {
        let body = r#"{"error":{"message":"Model requires a Pro subscription"}}"#;
        assert_eq!(
            OpenAiCompatProvider::error_message(body),
            "Model requires a Pro subscription"
        );
    }

    #[test]
    fn error_message_from_plain_envelope() {
        let body = r#"{"error":"Rate limit reached"}"#;
        assert_eq!(OpenAiCompatProvider::error_message(body), "Rate limit reached");
    }

    #[test]
    fn error_message_from_raw_text() {
        assert_eq!(
            OpenAiCompatProvider::error_message("Bad Gateway"),
            "Bad Gateway"
        );
    }

    #[test]
    fn loading_signal_is_transient() {
        let provider = OpenAiCompatProvider::huggingface("hf-test");

        let err = provider.classify_failure(
            "meta-llama/Llama-3.1-8B-Instruct",
            400,
            r#"{"error":"Model meta-llama/Llama-3.1-8B-Instruct is currently loading"}"#,
        );
        assert!(matches!(err, ProviderError::ModelLoading { .. }));

        let err = provider.classify_failure("m", 503, "Service Unavailable");
        assert!(matches!(err, ProviderError::ModelLoading { .. }));
    }

    #[test]
    fn other_failures_are_permanent() {
        let provider = OpenAiCompatProvider::groq("gsk-test");
        let err = provider.classify_failure("m", 401, r#"{"error":{"message":"Invalid API key"}}"#);
        match err {
            ProviderError::Api {
                provider,
                status_code,
                message,
            } => {
                assert_eq!(provider, "groq");
                assert_eq!(status_code, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn parse_completion_content() {
        let body = r#"{"model":"llama-3.1-8b-instant","choices":[{"message":{"role":"assistant","content":"  Hello there.  "}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap().trim();
        assert_eq!(content, "Hello there.");
    }

    #[test]
    fn absent_content_parses_as_none() {
        let body = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn no_choices_parses_as_empty() {
        let body = r#"{"model":"m"}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
