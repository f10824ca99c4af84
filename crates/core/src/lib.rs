//! # Ragline Core
//!
//! Domain types, traits, and error definitions for the Ragline RAG chat
//! pipeline. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod knowledge;
pub mod message;
pub mod persona;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, IngestionError, KnowledgeError, ProviderError, Result};
pub use knowledge::{KnowledgeStore, KnowledgeUnit, RetrievedSnippet, SourceType};
pub use message::{DialogueMessage, OwnerScope, PromptMessage, Role};
pub use persona::{PersonaDirectory, PersonaPrompt};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
