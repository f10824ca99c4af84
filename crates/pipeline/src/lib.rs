//! The Ragline chat pipeline.
//!
//! Wires retrieval, prompt assembly, context windowing, and provider
//! orchestration into the three entry points callers use: `ingest`,
//! `respond`, and `remove_knowledge`. Everything stateful lives behind
//! the injected collaborators; this crate is glue plus two pure
//! functions (the assembler and the window).

pub mod assembler;
pub mod engine;
pub mod window;

pub use assembler::{assemble, NO_EVIDENCE_NOTICE};
pub use engine::{
    ChatEngine, ChatOutcome, ChatRequest, EmptyPolicy, IngestOptions, DEFAULT_PERSONA,
    PLACEHOLDER_CONTENT,
};
pub use window::{window, DEFAULT_WINDOW_SIZE};
