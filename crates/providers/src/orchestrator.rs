//! Provider orchestrator — selects and calls providers per request.
//!
//! One request walks `SelectPrimary → CallPrimary → {Success | Degraded}`,
//! with an optional parallel `SelectComparison → CallComparison` branch in
//! comparison mode. Degradation is total: whatever happens upstream, the
//! orchestrator hands back renderable assistant text so the chat turn
//! completes. Structured error kinds go to the log only.
//!
//! At most one attempt per provider per request; a fresh user turn is the
//! retry mechanism.

use ragline_core::error::ProviderError;
use ragline_core::message::PromptMessage;
use ragline_core::provider::{ProviderRequest, ProviderResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::model_hints::ModelRoutingTable;
use crate::registry::{ProviderRegistry, RegisteredProvider};

/// Operator-facing remediation text rendered to the end user when no
/// provider has credentials. The turn still completes and is persisted
/// with this as the assistant content.
pub const UNCONFIGURED_REMEDIATION: &str = "No AI provider is configured. \
Set GROQ_API_KEY or HUGGINGFACE_API_KEY (or add a provider to \
~/.ragline/config.toml) and restart the service.";

/// Tuning for every provider call the orchestrator issues.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Bound on each provider call. Elapsing it is a permanent failure for
    /// that branch; there is no in-request retry.
    pub call_timeout: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.7,
            call_timeout: Duration::from_secs(120),
        }
    }
}

/// One generation request: assembled system prompt plus windowed history.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The Prompt Assembler output, sent as a single system message
    pub system_prompt: Option<String>,
    /// Windowed dialogue, oldest first
    pub history: Vec<PromptMessage>,
    /// Whether to run the comparison branch
    pub compare: bool,
    /// Model identifier for the comparison branch
    pub comparison_model: Option<String>,
}

/// The joined result of the primary (and optional comparison) branch.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Always renderable: the completion, degraded error text, or the
    /// unconfigured remediation
    pub assistant_text: String,
    /// Which provider served (or was attempted for) the primary branch;
    /// `None` only when unconfigured
    pub provider_used: Option<String>,
    /// Comparison completion or inline error string
    pub comparison_text: Option<String>,
    pub comparison_provider_used: Option<String>,
}

/// Routes generation requests across the registered providers.
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    routing: ModelRoutingTable,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            routing: ModelRoutingTable::default(),
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_routing(mut self, routing: ModelRoutingTable) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute the state machine for one request.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        let Some(primary) = self.registry.primary() else {
            info!("No provider configured; returning remediation text");
            return GenerationOutcome {
                assistant_text: UNCONFIGURED_REMEDIATION.to_string(),
                provider_used: None,
                comparison_text: None,
                comparison_provider_used: None,
            };
        };

        let messages = Self::build_messages(&request);
        let comparison_target = self.select_comparison(&request, primary);

        info!(
            primary = %primary.id,
            compare = comparison_target.is_some(),
            "Dispatching generation request"
        );

        let primary_request = ProviderRequest {
            model: primary.default_model.clone(),
            messages: messages.clone(),
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };

        let comparison_future = async {
            match &comparison_target {
                Some((entry, model)) => {
                    let request = ProviderRequest {
                        model: model.clone(),
                        messages: messages.clone(),
                        temperature: self.options.temperature,
                        max_tokens: self.options.max_tokens,
                    };
                    Some(self.call(entry, request).await)
                }
                None => None,
            }
        };

        // Both branches are independent network calls; issue them together
        // and join. A comparison failure never touches the primary result.
        let (primary_result, comparison_result) =
            futures::join!(self.call(primary, primary_request), comparison_future);

        let assistant_text = match primary_result {
            Ok(response) => response.content,
            Err(e) => {
                warn!(provider = %primary.id, error = %e, transient = e.is_transient(), "Primary provider call failed");
                degraded_text(&e)
            }
        };

        let (comparison_text, comparison_provider_used) = match comparison_result {
            Some(Ok(response)) => (
                Some(response.content),
                comparison_target.map(|(entry, _)| entry.id),
            ),
            Some(Err(e)) => {
                warn!(error = %e, "Comparison provider call failed");
                (
                    Some(format!("Comparison model error: {e}")),
                    comparison_target.map(|(entry, _)| entry.id),
                )
            }
            None => (None, None),
        };

        GenerationOutcome {
            assistant_text,
            provider_used: Some(primary.id.clone()),
            comparison_text,
            comparison_provider_used,
        }
    }

    /// Build the wire message sequence: optional system message first, then
    /// the windowed dialogue.
    fn build_messages(request: &GenerationRequest) -> Vec<PromptMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(PromptMessage::system(system.clone()));
        }
        messages.extend(request.history.iter().cloned());
        messages
    }

    /// Decide whether and where the comparison branch runs.
    ///
    /// The routing table maps the model hint to a provider; a hint that
    /// matches no rule goes to huggingface when registered, else to the
    /// primary.
    fn select_comparison(
        &self,
        request: &GenerationRequest,
        primary: &RegisteredProvider,
    ) -> Option<(RegisteredProvider, String)> {
        if !request.compare {
            return None;
        }
        let model = request.comparison_model.as_deref()?;

        let entry = self
            .routing
            .resolve(model)
            .and_then(|id| self.registry.get(id))
            .or_else(|| self.registry.get("huggingface"))
            .unwrap_or(primary);

        Some((entry.clone(), model.to_string()))
    }

    /// One bounded provider call.
    async fn call(
        &self,
        entry: &RegisteredProvider,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        match tokio::time::timeout(self.options.call_timeout, entry.provider.complete(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: entry.id.clone(),
                after_secs: self.options.call_timeout.as_secs(),
            }),
        }
    }
}

/// Render a primary-branch failure as user-visible assistant text.
fn degraded_text(err: &ProviderError) -> String {
    match err {
        ProviderError::ModelLoading { model } => format!(
            "The model \"{model}\" is currently loading. Please try again in 30 seconds."
        ),
        other => format!("AI error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::provider::Provider;

    /// A mock provider that always returns the same text.
    struct EchoProvider {
        name: String,
        reply: String,
    }

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                content: self.reply.clone(),
                model: "mock-model".into(),
            })
        }
    }

    /// A mock provider that always fails with a fixed error.
    struct FailingProvider {
        name: String,
        error: ProviderError,
    }

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(self.error.clone())
        }
    }

    /// A mock provider that hangs forever (for timeout testing).
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn echo(id: &str, reply: &str) -> Arc<dyn Provider> {
        Arc::new(EchoProvider {
            name: id.into(),
            reply: reply.into(),
        })
    }

    fn request(compare: bool, comparison_model: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            system_prompt: Some("You are grounded.".into()),
            history: vec![PromptMessage::user("hello")],
            compare,
            comparison_model: comparison_model.map(String::from),
        }
    }

    #[tokio::test]
    async fn unconfigured_returns_remediation_not_error() {
        let orchestrator = Orchestrator::new(Arc::new(ProviderRegistry::new()));
        let outcome = orchestrator.generate(request(false, None)).await;
        assert_eq!(outcome.assistant_text, UNCONFIGURED_REMEDIATION);
        assert!(outcome.provider_used.is_none());
        assert!(outcome.comparison_text.is_none());
    }

    #[tokio::test]
    async fn single_provider_serves_primary() {
        let mut registry = ProviderRegistry::new();
        registry.register("huggingface", echo("huggingface", "primary answer"), "hf-model");

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let outcome = orchestrator.generate(request(false, None)).await;

        assert_eq!(outcome.assistant_text, "primary answer");
        assert_eq!(outcome.provider_used.as_deref(), Some("huggingface"));
        assert!(outcome.comparison_text.is_none());
        assert!(outcome.comparison_provider_used.is_none());
    }

    #[tokio::test]
    async fn primary_failure_degrades_to_text() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            "groq",
            Arc::new(FailingProvider {
                name: "groq".into(),
                error: ProviderError::Api {
                    provider: "groq".into(),
                    status_code: 500,
                    message: "Internal Server Error".into(),
                },
            }),
            "groq-model",
        );

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let outcome = orchestrator.generate(request(false, None)).await;

        assert!(outcome.assistant_text.contains("500"));
        assert!(outcome.assistant_text.contains("groq"));
        assert_eq!(outcome.provider_used.as_deref(), Some("groq"));
    }

    #[tokio::test]
    async fn model_loading_renders_retry_suggestion() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            "huggingface",
            Arc::new(FailingProvider {
                name: "huggingface".into(),
                error: ProviderError::ModelLoading {
                    model: "meta-llama/Llama-3.1-8B-Instruct".into(),
                },
            }),
            "meta-llama/Llama-3.1-8B-Instruct",
        );

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let outcome = orchestrator.generate(request(false, None)).await;

        assert!(outcome.assistant_text.contains("currently loading"));
        assert!(outcome.assistant_text.contains("try again"));
    }

    #[tokio::test]
    async fn comparison_routes_by_model_hint() {
        let mut registry = ProviderRegistry::new();
        registry.register("groq", echo("groq", "groq answer"), "groq-model");
        registry.register("huggingface", echo("huggingface", "hf answer"), "hf-model");

        let orchestrator = Orchestrator::new(Arc::new(registry));

        // "70b" matches the stock groq rule
        let outcome = orchestrator
            .generate(request(true, Some("meta-llama/Llama-3.3-70B-Instruct")))
            .await;
        assert_eq!(outcome.comparison_provider_used.as_deref(), Some("groq"));
        assert_eq!(outcome.comparison_text.as_deref(), Some("groq answer"));

        // An unknown family falls back to huggingface
        let outcome = orchestrator
            .generate(request(true, Some("gemma-2-9b-it")))
            .await;
        assert_eq!(
            outcome.comparison_provider_used.as_deref(),
            Some("huggingface")
        );
    }

    #[tokio::test]
    async fn compare_without_model_hint_skips_branch() {
        let mut registry = ProviderRegistry::new();
        registry.register("groq", echo("groq", "answer"), "groq-model");

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let outcome = orchestrator.generate(request(true, None)).await;

        assert_eq!(outcome.assistant_text, "answer");
        assert!(outcome.comparison_text.is_none());
    }

    #[tokio::test]
    async fn comparison_timeout_is_isolated() {
        // huggingface first so the hanging groq provider only serves the
        // comparison branch
        let mut registry = ProviderRegistry::new();
        registry.register("huggingface", echo("huggingface", "primary ok"), "hf-model");
        registry.register("groq", Arc::new(HangingProvider), "groq-model");

        let orchestrator = Orchestrator::new(Arc::new(registry)).with_options(OrchestratorOptions {
            call_timeout: Duration::from_millis(50),
            ..OrchestratorOptions::default()
        });

        // "70b" routes the comparison branch to the hanging groq provider
        let outcome = orchestrator
            .generate(request(true, Some("llama-70b")))
            .await;

        assert_eq!(outcome.assistant_text, "primary ok");
        let comparison = outcome.comparison_text.unwrap();
        assert!(comparison.starts_with("Comparison model error:"));
        assert!(comparison.contains("timed out"));
    }

    #[tokio::test]
    async fn primary_timeout_degrades_to_text() {
        let mut registry = ProviderRegistry::new();
        registry.register("groq", Arc::new(HangingProvider), "groq-model");

        let orchestrator = Orchestrator::new(Arc::new(registry)).with_options(OrchestratorOptions {
            call_timeout: Duration::from_millis(50),
            ..OrchestratorOptions::default()
        });

        let outcome = orchestrator.generate(request(false, None)).await;
        assert!(outcome.assistant_text.contains("timed out"));
        assert_eq!(outcome.provider_used.as_deref(), Some("groq"));
    }

    #[tokio::test]
    async fn comparison_failure_never_blocks_primary() {
        let mut registry = ProviderRegistry::new();
        registry.register("huggingface", echo("huggingface", "steady answer"), "hf-model");
        registry.register(
            "groq",
            Arc::new(FailingProvider {
                name: "groq".into(),
                error: ProviderError::Network("connection refused".into()),
            }),
            "groq-model",
        );

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let outcome = orchestrator
            .generate(request(true, Some("mixtral-8x7b")))
            .await;

        assert_eq!(outcome.assistant_text, "steady answer");
        assert!(outcome
            .comparison_text
            .unwrap()
            .contains("connection refused"));
    }

    #[test]
    fn system_message_leads_the_wire_sequence() {
        let messages = Orchestrator::build_messages(&request(false, None));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ragline_core::message::Role::System);
        assert_eq!(messages[1].content, "hello");
    }
}
