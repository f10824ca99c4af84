//! `ragline chat` — Interactive or single-message retrieval-grounded chat.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ragline_config::RaglineConfig;
use ragline_core::knowledge::SourceType;
use ragline_core::message::DialogueMessage;
use ragline_core::persona::{PersonaDirectory, PersonaPrompt};
use ragline_knowledge::in_memory::InMemoryKnowledgeStore;
use ragline_pipeline::engine::{ChatEngine, ChatOutcome, ChatRequest, IngestOptions};
use ragline_providers::orchestrator::{Orchestrator, OrchestratorOptions};
use ragline_providers::registry;

pub async fn run(
    message: Option<String>,
    ingest: Vec<String>,
    persona: Option<String>,
    compare: bool,
) -> anyhow::Result<()> {
    let config = RaglineConfig::load().context("Failed to load config")?;

    let provider_registry = registry::build_from_config(&config);
    if provider_registry.is_empty() {
        eprintln!();
        eprintln!("  WARNING: No AI provider is configured.");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY=gsk-...");
        eprintln!("    HUGGINGFACE_API_KEY=hf_...");
        eprintln!();
        eprintln!(
            "  Or add a [providers.*] table to {}",
            RaglineConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
    }

    let orchestrator = Orchestrator::new(Arc::new(provider_registry.clone())).with_options(
        OrchestratorOptions {
            max_tokens: config.chat.max_tokens,
            temperature: config.chat.temperature,
            call_timeout: Duration::from_secs(config.chat.call_timeout_secs),
        },
    );

    let store = Arc::new(InMemoryKnowledgeStore::new());
    let engine = ChatEngine::new(store, orchestrator)
        .with_window_size(config.chat.window_size)
        .with_retrieval_limit(config.chat.retrieval_limit);

    // Session-local knowledge base
    for path in &ingest {
        let count = ingest_file(&engine, path, &config).await?;
        println!("  Loaded {path} ({count} fragments)");
    }

    // Session persona, exercised through the directory so a later
    // `persona` management command slots in without engine changes
    let personas = PersonaDirectory::new();
    if let Some(text) = persona {
        let id = personas
            .insert(PersonaPrompt::new(None, "session", text))
            .await;
        personas.activate(None, &id).await;
    }

    let comparison_model = config.comparison_model.clone();
    if compare && comparison_model.is_none() {
        eprintln!("  WARNING: --compare given but no comparison_model configured; ignoring.");
    }

    if let Some(utterance) = message {
        // Single message mode
        let request = ChatRequest {
            utterance,
            history: Vec::new(),
            persona_text: personas.active_text(None).await,
            scope: None,
            compare,
            comparison_model,
        };

        let outcome = engine.respond(request).await;
        print_outcome(&outcome);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Ragline — retrieval-grounded chat");
    if let Some(primary) = provider_registry.primary() {
        println!("  Provider:  {} ({})", primary.id, primary.default_model);
    } else {
        println!("  Provider:  none configured");
    }
    println!("  Knowledge: {} document(s) loaded", ingest.len());
    println!();
    println!("  Type your message and press Enter. Type 'exit' to quit.");
    println!();

    let mut history: Vec<DialogueMessage> = Vec::new();
    let stdin = std::io::stdin();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if utterance == "exit" || utterance == "quit" {
            break;
        }

        let request = ChatRequest {
            utterance: utterance.to_string(),
            history: history.clone(),
            persona_text: personas.active_text(None).await,
            scope: None,
            compare,
            comparison_model: comparison_model.clone(),
        };

        let outcome = engine.respond(request).await;
        println!();
        print_outcome(&outcome);
        println!();

        history.push(DialogueMessage::user(utterance));
        history.push(outcome.into_message());
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

/// Read a text/markdown file into the session knowledge base.
///
/// PDF extraction lives with an external collaborator, so the CLI only
/// accepts formats it can read as plain text.
async fn ingest_file(
    engine: &ChatEngine,
    path: &str,
    config: &RaglineConfig,
) -> anyhow::Result<usize> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let source_type = SourceType::from_extension(extension)?;
    anyhow::ensure!(
        source_type != SourceType::Pdf,
        "PDF text extraction is not available here; convert {path} to txt or md first"
    );

    let raw_text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let source_file = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    let options = IngestOptions {
        chunker: ragline_knowledge::chunker::ChunkerConfig {
            max_chunk_size: config.chunking.max_chunk_size,
            min_chunk_len: config.chunking.min_chunk_len,
        },
        empty_policy: ragline_pipeline::engine::EmptyPolicy::Reject,
    };

    let count = engine
        .ingest(&raw_text, source_file, source_type, None, &options)
        .await?;
    Ok(count)
}

fn print_outcome(outcome: &ChatOutcome) {
    for line in outcome.assistant_text.lines() {
        println!("  Assistant > {line}");
    }
    if let Some(comparison) = &outcome.comparison_text {
        println!();
        let label = outcome
            .comparison_provider_used
            .as_deref()
            .unwrap_or("comparison");
        for line in comparison.lines() {
            println!("  [{label}] > {line}");
        }
    }
}
