//! Model-hint routing table for the comparison branch.
//!
//! Which provider should serve a given comparison model is decided by
//! static, config-driven substring rules over the model name — data, not
//! inline conditionals, so new model families are added without touching
//! orchestration logic.

use serde::{Deserialize, Serialize};

/// One routing rule: a lowercase substring pattern and the provider id to
/// route matching models to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRule {
    pub pattern: String,
    pub provider: String,
}

/// Ordered substring rules mapping model-name hints to provider ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoutingTable {
    rules: Vec<ModelRule>,
}

impl Default for ModelRoutingTable {
    /// The stock table: model families Groq serves reliably.
    fn default() -> Self {
        let groq_families = ["70b", "deepseek", "llama3", "mixtral", "qwen"];
        Self {
            rules: groq_families
                .iter()
                .map(|pattern| ModelRule {
                    pattern: (*pattern).into(),
                    provider: "groq".into(),
                })
                .collect(),
        }
    }
}

impl ModelRoutingTable {
    pub fn new(rules: Vec<ModelRule>) -> Self {
        Self { rules }
    }

    /// The provider id the first matching rule routes `model` to, if any.
    /// Matching is case-insensitive substring containment.
    pub fn resolve(&self, model: &str) -> Option<&str> {
        let model = model.to_lowercase();
        self.rules
            .iter()
            .find(|rule| model.contains(&rule.pattern.to_lowercase()))
            .map(|rule| rule.provider.as_str())
    }
}
