//! Document chunking and ranked knowledge retrieval for Ragline.
//!
//! The chunker turns extracted document text into bounded fragments, the
//! in-memory store indexes them with primitive free-text scoring, and the
//! retriever wraps the store behind a never-fails facade for the chat
//! pipeline.

pub mod chunker;
pub mod in_memory;
pub mod retriever;

pub use chunker::{chunk, ChunkerConfig};
pub use in_memory::InMemoryKnowledgeStore;
pub use retriever::Retriever;
