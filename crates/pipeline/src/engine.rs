//! ChatEngine — the pipeline entry points.
//!
//! One engine instance wires a knowledge store, a retriever, and the
//! provider orchestrator. `respond` never returns an error: every
//! provider failure mode arrives as degraded assistant text, so a turn
//! always completes and can always be persisted.

use ragline_core::error::{Error, IngestionError, Result};
use ragline_core::knowledge::{KnowledgeStore, KnowledgeUnit, SourceSummary, SourceType};
use ragline_core::message::{DialogueMessage, OwnerScope, PromptMessage};
use ragline_knowledge::chunker::{chunk, ChunkerConfig};
use ragline_knowledge::retriever::Retriever;
use ragline_providers::orchestrator::{GenerationRequest, Orchestrator};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::window::{window, DEFAULT_WINDOW_SIZE};

/// Persona used when the caller has no active persona of their own.
pub const DEFAULT_PERSONA: &str = "You are a helpful, knowledgeable \
assistant. Keep answers clear, direct, and honest about uncertainty.";

/// Sentinel stored for documents whose extraction produced no text, so
/// the source still shows up in the knowledge inventory.
pub const PLACEHOLDER_CONTENT: &str = "[SCANNED DOCUMENT - NO TEXT EXTRACTED]";

/// What `ingest` does when chunking yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Reject the document with `IngestionError::EmptyDocument`.
    Reject,
    /// Store the single placeholder sentinel unit instead.
    Placeholder,
}

/// Per-call ingestion settings.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub chunker: ChunkerConfig,
    pub empty_policy: EmptyPolicy,
}

impl Default for IngestOptions {
    /// Interactive upload: strict fragment minimum, empty documents
    /// rejected.
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            empty_policy: EmptyPolicy::Reject,
        }
    }
}

impl IngestOptions {
    /// Bulk ingestion: permissive fragment minimum, scanned documents
    /// recorded via the placeholder sentinel.
    pub fn bulk() -> Self {
        Self {
            chunker: ChunkerConfig::bulk(),
            empty_policy: EmptyPolicy::Placeholder,
        }
    }
}

/// One chat turn as seen from the pipeline boundary.
///
/// `history` is the prior dialogue only; the current `utterance` is
/// appended after windowing so it is never cut off by the window.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub utterance: String,
    pub history: Vec<DialogueMessage>,
    /// Active persona text; the default persona applies when absent
    pub persona_text: Option<String>,
    pub scope: Option<OwnerScope>,
    pub compare: bool,
    pub comparison_model: Option<String>,
}

impl ChatRequest {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            history: Vec::new(),
            persona_text: None,
            scope: None,
            compare: false,
            comparison_model: None,
        }
    }
}

/// The completed turn. Always renderable, never an error.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub assistant_text: String,
    pub comparison_text: Option<String>,
    /// `None` only when no provider is configured
    pub provider_used: Option<String>,
    pub comparison_provider_used: Option<String>,
}

impl ChatOutcome {
    /// The single assistant message this turn appends to the dialogue.
    pub fn into_message(self) -> DialogueMessage {
        let message = DialogueMessage::assistant(self.assistant_text);
        match self.comparison_text {
            Some(comparison) => message.with_comparison(comparison),
            None => message,
        }
    }
}

/// The assembled pipeline.
pub struct ChatEngine {
    store: Arc<dyn KnowledgeStore>,
    retriever: Retriever,
    orchestrator: Orchestrator,
    window_size: usize,
}

impl ChatEngine {
    pub fn new(store: Arc<dyn KnowledgeStore>, orchestrator: Orchestrator) -> Self {
        Self {
            retriever: Retriever::new(store.clone()),
            store,
            orchestrator,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retriever = Retriever::new(self.store.clone()).with_limit(limit);
        self
    }

    /// Chunk a raw document and store every fragment as a knowledge unit.
    ///
    /// Returns how many units were stored. A document that chunks to
    /// nothing is handled per the `EmptyPolicy`.
    pub async fn ingest(
        &self,
        raw_text: &str,
        source_file: &str,
        source_type: SourceType,
        scope: Option<OwnerScope>,
        options: &IngestOptions,
    ) -> Result<usize> {
        let chunks = chunk(raw_text, &options.chunker);

        if chunks.is_empty() {
            return match options.empty_policy {
                EmptyPolicy::Reject => Err(IngestionError::EmptyDocument {
                    source_file: source_file.to_string(),
                }
                .into()),
                EmptyPolicy::Placeholder => {
                    info!(source_file, "Document produced no text, storing placeholder");
                    self.store
                        .add(KnowledgeUnit::new(
                            scope,
                            PLACEHOLDER_CONTENT,
                            source_file,
                            source_type,
                        ))
                        .await
                        .map_err(Error::Knowledge)?;
                    Ok(1)
                }
            };
        }

        let count = chunks.len();
        for fragment in chunks {
            let added = self
                .store
                .add(KnowledgeUnit::new(
                    scope.clone(),
                    fragment,
                    source_file,
                    source_type,
                ))
                .await;
            if let Err(e) = added {
                // A failed ingest must leave no fragments of the document
                // behind, or the source would show up half-stored in the
                // inventory
                warn!(source_file, error = %e, "Ingest failed, removing stored fragments");
                let _ = self
                    .store
                    .delete_by_source(source_file, scope.as_ref())
                    .await;
                return Err(Error::Knowledge(e));
            }
        }

        info!(source_file, units = count, "Document ingested");
        Ok(count)
    }

    /// Run one chat turn: retrieve, assemble, window, generate.
    pub async fn respond(&self, request: ChatRequest) -> ChatOutcome {
        let snippets = self
            .retriever
            .retrieve(&request.utterance, request.scope.as_ref())
            .await;

        let persona = request.persona_text.as_deref().unwrap_or(DEFAULT_PERSONA);
        let system_prompt = assemble(persona, &snippets);

        let mut history = window(&request.history, self.window_size);
        history.push(PromptMessage::user(request.utterance));

        debug!(
            snippets = snippets.len(),
            history = history.len(),
            compare = request.compare,
            "Dispatching chat turn"
        );

        let outcome = self
            .orchestrator
            .generate(GenerationRequest {
                system_prompt: Some(system_prompt),
                history,
                compare: request.compare,
                comparison_model: request.comparison_model,
            })
            .await;

        ChatOutcome {
            assistant_text: outcome.assistant_text,
            comparison_text: outcome.comparison_text,
            provider_used: outcome.provider_used,
            comparison_provider_used: outcome.comparison_provider_used,
        }
    }

    /// Delete every unit of a source file within a scope.
    pub async fn remove_knowledge(
        &self,
        source_file: &str,
        scope: Option<&OwnerScope>,
    ) -> Result<usize> {
        let removed = self
            .store
            .delete_by_source(source_file, scope)
            .await
            .map_err(Error::Knowledge)?;
        info!(source_file, removed, "Knowledge removed");
        Ok(removed)
    }

    /// Per-file inventory of stored knowledge.
    pub async fn list_sources(
        &self,
        scope: Option<&OwnerScope>,
    ) -> Result<Vec<SourceSummary>> {
        self.store
            .list_sources(scope)
            .await
            .map_err(Error::Knowledge)
    }
}
