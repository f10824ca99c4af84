//! Provider registry — the capability list resolved once at startup.
//!
//! Providers with a usable credential are registered in fixed priority
//! order (`groq` before `huggingface`, extras after); the first entry is
//! the primary for every request. The orchestrator receives the registry
//! by injection and never inspects the environment itself.

use ragline_config::{RaglineConfig, PROVIDER_PRIORITY};
use ragline_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::openai_compat::OpenAiCompatProvider;

/// A provider admitted to the capability list.
#[derive(Clone)]
pub struct RegisteredProvider {
    /// Stable provider id ("groq", "huggingface", ...)
    pub id: String,
    pub provider: Arc<dyn Provider>,
    /// The model requests go to unless the caller names one
    pub default_model: String,
}

/// Ordered list of available providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider to the priority order.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        provider: Arc<dyn Provider>,
        default_model: impl Into<String>,
    ) {
        self.entries.push(RegisteredProvider {
            id: id.into(),
            provider,
            default_model: default_model.into(),
        });
    }

    /// The highest-priority provider, if any is configured.
    pub fn primary(&self) -> Option<&RegisteredProvider> {
        self.entries.first()
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<&RegisteredProvider> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All registered providers in priority order.
    pub fn entries(&self) -> &[RegisteredProvider] {
        &self.entries
    }

    /// Registered provider ids in priority order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }
}

/// Build the registry from configuration. Called once at startup.
pub fn build_from_config(config: &RaglineConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    // The same bound the orchestrator applies, so a Timeout error reports
    // the value that actually fired
    let call_timeout = Duration::from_secs(config.chat.call_timeout_secs);

    // Well-known providers in fixed priority order
    for &id in PROVIDER_PRIORITY {
        let Some(provider_config) = config.providers.get(id) else {
            continue;
        };
        if !provider_config.has_credential() {
            continue;
        }

        let api_key = provider_config.api_key.clone().unwrap_or_default();
        let Some(base_url) = provider_config
            .api_url
            .clone()
            .or_else(|| default_base_url(id))
        else {
            warn!(provider = %id, "Skipping provider with no api_url");
            continue;
        };
        let model = provider_config
            .default_model
            .clone()
            .unwrap_or_else(|| default_model(id));

        registry.register(
            id,
            Arc::new(OpenAiCompatProvider::new(id, &base_url, &api_key).with_timeout(call_timeout)),
            model,
        );
    }

    // Extra OpenAI-compatible entries after the well-known ones, in name
    // order for determinism
    let mut extras: Vec<&String> = config
        .providers
        .keys()
        .filter(|id| !PROVIDER_PRIORITY.contains(&id.as_str()))
        .collect();
    extras.sort();

    for id in extras {
        let provider_config = &config.providers[id];
        if !provider_config.has_credential() {
            continue;
        }
        let Some(base_url) = provider_config.api_url.clone() else {
            warn!(provider = %id, "Skipping provider with no api_url");
            continue;
        };
        let Some(model) = provider_config.default_model.clone() else {
            warn!(provider = %id, "Skipping provider with no default_model");
            continue;
        };
        let api_key = provider_config.api_key.clone().unwrap_or_default();
        registry.register(
            id.clone(),
            Arc::new(OpenAiCompatProvider::new(id, &base_url, &api_key).with_timeout(call_timeout)),
            model,
        );
    }

    info!(providers = ?registry.ids(), "Provider registry resolved");
    registry
}

/// Default base URL, defined only for the well-known providers. Anything
/// else must configure `api_url` explicitly.
fn default_base_url(provider_id: &str) -> Option<String> {
    match provider_id {
        "groq" => Some("https://api.groq.com/openai/v1".into()),
        "huggingface" => Some("https://router.huggingface.co/hf-inference/v1".into()),
        _ => None,
    }
}

/// Default model for well-known providers.
fn default_model(provider_id: &str) -> String {
    match provider_id {
        "groq" => "llama-3.1-8b-instant".into(),
        _ => "meta-llama/Llama-3.1-8B-Instruct".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_config::ProviderConfig;

    fn config_with_keys(pairs: &[(&str, &str)]) -> RaglineConfig {
        let mut config = RaglineConfig::default();
        for (id, key) in pairs {
            config.providers.insert(
                (*id).into(),
                ProviderConfig {
                    api_key: Some((*key).into()),
                    api_url: None,
                    default_model: None,
                },
            );
        }
        config
    }

    #[test]
    fn groq_outranks_huggingface() {
        let registry =
            build_from_config(&config_with_keys(&[("huggingface", "hf-x"), ("groq", "gsk-x")]));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.primary().unwrap().id, "groq");
    }

    #[test]
    fn huggingface_alone_is_primary() {
        let registry = build_from_config(&config_with_keys(&[("huggingface", "hf-x")]));
        assert_eq!(registry.primary().unwrap().id, "huggingface");
        assert_eq!(
            registry.primary().unwrap().default_model,
            "meta-llama/Llama-3.1-8B-Instruct"
        );
    }

    #[test]
    fn no_credentials_means_empty_registry() {
        let mut config = RaglineConfig::default();
        config.providers.insert(
            "groq".into(),
            ProviderConfig {
                api_key: Some("  ".into()),
                api_url: None,
                default_model: None,
            },
        );
        let registry = build_from_config(&config);
        assert!(registry.is_empty());
        assert!(registry.primary().is_none());
    }

    #[test]
    fn config_model_overrides_default() {
        let mut config = config_with_keys(&[("groq", "gsk-x")]);
        config.providers.get_mut("groq").unwrap().default_model =
            Some("llama-3.3-70b-versatile".into());
        let registry = build_from_config(&config);
        assert_eq!(
            registry.primary().unwrap().default_model,
            "llama-3.3-70b-versatile"
        );
    }

    #[test]
    fn default_base_urls_cover_only_well_known_providers() {
        assert!(default_base_url("groq").unwrap().contains("api.groq.com"));
        assert!(
            default_base_url("huggingface")
                .unwrap()
                .contains("router.huggingface.co")
        );
        assert!(default_base_url("local").is_none());
    }

    #[test]
    fn extra_provider_needs_url_and_model() {
        let mut config = config_with_keys(&[("local", "unused")]);
        // No api_url / default_model → skipped
        assert!(build_from_config(&config).is_empty());

        let entry = config.providers.get_mut("local").unwrap();
        entry.api_url = Some("http://localhost:8080/v1".into());
        entry.default_model = Some("local-model".into());
        let registry = build_from_config(&config);
        assert_eq!(registry.ids(), vec!["local"]);
    }
}
