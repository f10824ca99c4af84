//! In-memory knowledge store — the default backend.
//!
//! Holds units in a Vec behind an async RwLock with a monotone insertion
//! sequence for deterministic tie-breaking. Scoring is primitive term
//! matching: the query is lowercased and split on non-alphanumeric
//! boundaries, each unit scored by summed term occurrences normalized by
//! content length.

use async_trait::async_trait;
use ragline_core::error::KnowledgeError;
use ragline_core::knowledge::{KnowledgeStore, KnowledgeUnit, RetrievedSnippet, SourceSummary};
use ragline_core::message::OwnerScope;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory store backed by a Vec.
pub struct InMemoryKnowledgeStore {
    inner: Arc<RwLock<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    units: Vec<IndexedUnit>,
    next_seq: u64,
}

struct IndexedUnit {
    /// Insertion order, used to break score ties (most recent first).
    seq: u64,
    unit: KnowledgeUnit,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState::default())),
        }
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase terms of `text`, split on non-alphanumeric boundaries.
fn terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Summed term occurrences, normalized by content length so short relevant
/// fragments outrank long ones with the same hit count.
fn relevance(content: &str, query_terms: &[String]) -> f32 {
    let haystack = content.to_lowercase();
    let hits: usize = query_terms
        .iter()
        .map(|t| haystack.matches(t.as_str()).count())
        .sum();
    hits as f32 / (content.len() as f32 / 100.0).max(1.0)
}

/// Whether a unit is visible to a query scope. A scoped query sees its own
/// units plus global ones; an unscoped query sees everything.
fn visible(unit: &KnowledgeUnit, scope: Option<&OwnerScope>) -> bool {
    match scope {
        Some(s) => unit.scope.is_none() || unit.scope.as_ref() == Some(s),
        None => true,
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn add(&self, mut unit: KnowledgeUnit) -> Result<String, KnowledgeError> {
        if unit.content.trim().is_empty() {
            return Err(KnowledgeError::Storage(
                "refusing to store a unit with empty content".into(),
            ));
        }
        if unit.id.is_empty() {
            unit.id = Uuid::new_v4().to_string();
        }
        let id = unit.id.clone();

        let mut state = self.inner.write().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.units.push(IndexedUnit { seq, unit });
        Ok(id)
    }

    async fn query(
        &self,
        text: &str,
        scope: Option<&OwnerScope>,
        limit: usize,
    ) -> Result<Vec<RetrievedSnippet>, KnowledgeError> {
        let query_terms = terms(text);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.inner.read().await;
        let mut scored: Vec<(u64, RetrievedSnippet)> = state
            .units
            .iter()
            .filter(|iu| visible(&iu.unit, scope))
            .filter_map(|iu| {
                let score = relevance(&iu.unit.content, &query_terms);
                (score > 0.0).then(|| {
                    (
                        iu.seq,
                        RetrievedSnippet {
                            unit: iu.unit.clone(),
                            score,
                        },
                    )
                })
            })
            .collect();

        // Descending score, ties broken by insertion recency
        scored.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(seq_b.cmp(seq_a))
        });
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, s)| s).collect())
    }

    async fn delete_by_source(
        &self,
        source_file: &str,
        scope: Option<&OwnerScope>,
    ) -> Result<usize, KnowledgeError> {
        let mut state = self.inner.write().await;
        let len_before = state.units.len();
        state
            .units
            .retain(|iu| !(iu.unit.source_file == source_file && iu.unit.scope.as_ref() == scope));
        Ok(len_before - state.units.len())
    }

    async fn list_sources(
        &self,
        scope: Option<&OwnerScope>,
    ) -> Result<Vec<SourceSummary>, KnowledgeError> {
        let state = self.inner.read().await;
        let mut summaries: Vec<SourceSummary> = Vec::new();
        for iu in state.units.iter().filter(|iu| visible(&iu.unit, scope)) {
            match summaries
                .iter_mut()
                .find(|s| s.source_file == iu.unit.source_file)
            {
                Some(existing) => existing.unit_count += 1,
                None => summaries.push(SourceSummary {
                    source_file: iu.unit.source_file.clone(),
                    source_type: iu.unit.source_type,
                    unit_count: 1,
                }),
            }
        }
        Ok(summaries)
    }

    async fn count(&self) -> Result<usize, KnowledgeError> {
        Ok(self.inner.read().await.units.len())
    }
}
