//! Persona prompts and the active-persona directory.
//!
//! A persona is the instruction text defining the assistant's behavior and
//! style, distinct from per-turn dialogue. Personas are created and edited
//! by an administrative collaborator; the pipeline only reads the active
//! text for a scope.
//!
//! Activation is a single reference swap per scope under one write lock.
//! There is no deactivate-all-then-activate window, so at most one persona
//! is active per scope at any observable moment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::message::OwnerScope;

/// A stored persona / system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaPrompt {
    pub id: String,

    /// Ownership scope; `None` means the global persona pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<OwnerScope>,

    /// Human-readable label
    pub name: String,

    /// The instruction text
    pub text: String,

    pub created_at: DateTime<Utc>,
}

impl PersonaPrompt {
    pub fn new(
        scope: Option<OwnerScope>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            name: name.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Scope key used in the active map. Global scope keys as an empty string,
/// which cannot collide with a real scope id.
fn scope_key(scope: Option<&OwnerScope>) -> String {
    scope.map(|s| s.0.clone()).unwrap_or_default()
}

/// In-memory persona registry with one active reference per scope.
#[derive(Default)]
pub struct PersonaDirectory {
    inner: Arc<RwLock<DirectoryState>>,
}

#[derive(Default)]
struct DirectoryState {
    prompts: Vec<PersonaPrompt>,
    /// scope key → active persona id
    active: HashMap<String, String>,
}

impl PersonaDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a persona, returning its id.
    pub async fn insert(&self, prompt: PersonaPrompt) -> String {
        let id = prompt.id.clone();
        self.inner.write().await.prompts.push(prompt);
        id
    }

    /// Make `id` the active persona for its scope. Returns false when no
    /// such persona exists. The previous active reference (if any) is
    /// replaced in the same write — no intermediate state is observable.
    pub async fn activate(&self, scope: Option<&OwnerScope>, id: &str) -> bool {
        let mut state = self.inner.write().await;
        let exists = state
            .prompts
            .iter()
            .any(|p| p.id == id && p.scope.as_ref() == scope);
        if exists {
            state.active.insert(scope_key(scope), id.to_string());
        }
        exists
    }

    /// Clear the active persona for a scope (fall back to the default).
    pub async fn deactivate(&self, scope: Option<&OwnerScope>) {
        self.inner.write().await.active.remove(&scope_key(scope));
    }

    /// The active persona's text for a scope, if one is set.
    pub async fn active_text(&self, scope: Option<&OwnerScope>) -> Option<String> {
        let state = self.inner.read().await;
        let id = state.active.get(&scope_key(scope))?;
        state
            .prompts
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.text.clone())
    }

    /// All personas within a scope, most recent first.
    pub async fn list(&self, scope: Option<&OwnerScope>) -> Vec<PersonaPrompt> {
        let state = self.inner.read().await;
        let mut prompts: Vec<PersonaPrompt> = state
            .prompts
            .iter()
            .filter(|p| p.scope.as_ref() == scope)
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        prompts
    }

    /// Remove a persona. Its active reference (if held) goes with it.
    pub async fn remove(&self, scope: Option<&OwnerScope>, id: &str) -> bool {
        let mut state = self.inner.write().await;
        let len_before = state.prompts.len();
        state
            .prompts
            .retain(|p| !(p.id == id && p.scope.as_ref() == scope));
        let removed = state.prompts.len() < len_before;
        if removed {
            let key = scope_key(scope);
            if state.active.get(&key).map(String::as_str) == Some(id) {
                state.active.remove(&key);
            }
        }
        removed
    }
}
