//! Knowledge store trait — bounded document fragments with ranked retrieval.
//!
//! A `KnowledgeUnit` is the atomic unit of retrieval: a trimmed fragment of
//! a source document, created by the chunker during ingestion and owned by
//! the store for its lifetime. Units are immutable; they are only ever
//! deleted in bulk by source file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IngestionError, KnowledgeError};
use crate::message::OwnerScope;

/// The document type a unit was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Txt,
    Md,
}

impl SourceType {
    /// Map a file extension onto a supported source type.
    ///
    /// This is the extraction collaborator's boundary check: anything else
    /// is rejected before chunking starts.
    pub fn from_extension(ext: &str) -> std::result::Result<Self, IngestionError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Txt),
            "md" => Ok(Self::Md),
            other => Err(IngestionError::UnsupportedType {
                extension: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Txt => write!(f, "txt"),
            Self::Md => write!(f, "md"),
        }
    }
}

/// A bounded, content-bearing fragment of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeUnit {
    /// Unique unit ID
    pub id: String,

    /// Ownership scope; `None` means globally visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<OwnerScope>,

    /// The fragment text. Invariant: never empty.
    pub content: String,

    /// Name of the document this fragment came from
    pub source_file: String,

    /// Document type of the source
    pub source_type: SourceType,

    /// When this unit was created
    pub created_at: DateTime<Utc>,
}

impl KnowledgeUnit {
    /// Create a new unit with a fresh id.
    pub fn new(
        scope: Option<OwnerScope>,
        content: impl Into<String>,
        source_file: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            content: content.into(),
            source_file: source_file.into(),
            source_type,
            created_at: Utc::now(),
        }
    }
}

/// A unit paired with its relevance score for one query. Ephemeral —
/// produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSnippet {
    pub unit: KnowledgeUnit,
    pub score: f32,
}

/// Per-file summary of stored knowledge, for inventory views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source_file: String,
    pub source_type: SourceType,
    pub unit_count: usize,
}

/// The core KnowledgeStore trait.
///
/// Implementations: in-memory (ships with `ragline-knowledge`); anything
/// with primitive free-text matching can sit behind this.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Store a unit, returning its id. Rejects empty content.
    async fn add(&self, unit: KnowledgeUnit) -> std::result::Result<String, KnowledgeError>;

    /// Relevance-ranked free-text query, descending score, ties broken by
    /// insertion recency (most recent first), truncated to `limit`.
    ///
    /// A scoped query sees that scope's units plus global units. Querying
    /// an empty store returns an empty vector, never an error.
    async fn query(
        &self,
        text: &str,
        scope: Option<&OwnerScope>,
        limit: usize,
    ) -> std::result::Result<Vec<RetrievedSnippet>, KnowledgeError>;

    /// Delete every unit belonging to `source_file` within `scope`,
    /// returning how many were removed.
    async fn delete_by_source(
        &self,
        source_file: &str,
        scope: Option<&OwnerScope>,
    ) -> std::result::Result<usize, KnowledgeError>;

    /// Group stored units by source file.
    async fn list_sources(
        &self,
        scope: Option<&OwnerScope>,
    ) -> std::result::Result<Vec<SourceSummary>, KnowledgeError>;

    /// Total stored unit count.
    async fn count(&self) -> std::result::Result<usize, KnowledgeError>;
}
