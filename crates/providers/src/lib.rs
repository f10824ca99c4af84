//! LLM provider clients and orchestration for Ragline.
//!
//! One OpenAI-compatible HTTP client covers every backend this pipeline
//! talks to (HuggingFace router, Groq, custom endpoints). The registry is
//! the capability list resolved once at startup; the orchestrator selects
//! and calls providers with graceful degradation.

pub mod model_hints;
pub mod openai_compat;
pub mod orchestrator;
pub mod registry;

pub use model_hints::ModelRoutingTable;
pub use openai_compat::OpenAiCompatProvider;
pub use orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator, OrchestratorOptions};
pub use registry::{ProviderRegistry, RegisteredProvider};
