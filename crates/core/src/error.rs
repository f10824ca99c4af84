//! Error types for the Ragline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Ragline operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Ingestion errors ---
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    // --- Knowledge store errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures while turning a raw document into stored knowledge units.
///
/// These are surfaced to the caller as structured failures — an ingestion
/// request that hits one of these is rejected outright.
#[derive(Debug, Clone, Error)]
pub enum IngestionError {
    #[error("Document '{source_file}' produced no usable text")]
    EmptyDocument { source_file: String },

    #[error("Unsupported document type: '{extension}' (expected pdf, txt, or md)")]
    UnsupportedType { extension: String },
}

/// Failures inside the knowledge store.
///
/// The retriever absorbs these into an empty result set; they never block a
/// chat turn.
#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Failures from an external model provider, classified per call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No provider has valid credentials at all.
    #[error("No provider configured: {0}")]
    Unconfigured(String),

    /// Transient: the remote model is still loading/initializing. Callers
    /// render a retry suggestion instead of a raw error.
    #[error("Model '{model}' is still loading")]
    ModelLoading { model: String },

    /// Permanent for this call: the provider answered with a non-success
    /// status that is not a loading signal.
    #[error("{provider} API error: {status_code} - {message}")]
    Api {
        provider: String,
        status_code: u16,
        message: String,
    },

    /// The bounded call timeout elapsed. Not retried within the request.
    #[error("Provider '{provider}' timed out after {after_secs}s")]
    Timeout { provider: String, after_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether a retry (as a fresh user turn) is likely to succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ModelLoading { .. })
    }
}
