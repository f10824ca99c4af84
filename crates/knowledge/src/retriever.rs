//! Retriever — the never-fails query facade over the knowledge store.
//!
//! Retrieval is an optimization, not a hard dependency of response
//! generation: any store failure is logged and absorbed into an empty
//! snippet set so the chat turn proceeds without evidence.

use ragline_core::knowledge::{KnowledgeStore, RetrievedSnippet};
use ragline_core::message::OwnerScope;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of snippets retrieved per turn.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Queries the knowledge store for a user utterance.
pub struct Retriever {
    store: Arc<dyn KnowledgeStore>,
    limit: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    /// Override the per-turn snippet limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Retrieve snippets for a user utterance, best-effort.
    ///
    /// The whole utterance is the query. Store failures return an empty
    /// set — never an error.
    pub async fn retrieve(
        &self,
        utterance: &str,
        scope: Option<&OwnerScope>,
    ) -> Vec<RetrievedSnippet> {
        match self.store.query(utterance, scope, self.limit).await {
            Ok(snippets) => {
                debug!(
                    store = self.store.name(),
                    count = snippets.len(),
                    "Retrieved knowledge snippets"
                );
                snippets
            }
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Knowledge query failed, continuing without evidence");
                Vec::new()
            }
        }
    }
}
