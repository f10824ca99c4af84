//! `ragline status` — Show configuration and provider availability.

use anyhow::Context;
use ragline_config::RaglineConfig;
use ragline_providers::registry;

pub async fn run() -> anyhow::Result<()> {
    let config = RaglineConfig::load().context("Failed to load config")?;
    let provider_registry = registry::build_from_config(&config);

    println!("Ragline Status");
    println!("==============");
    println!(
        "  Config file:      {}",
        RaglineConfig::config_dir().join("config.toml").display()
    );
    println!(
        "  Chunking:         max {} chars, min {} (bulk {})",
        config.chunking.max_chunk_size,
        config.chunking.min_chunk_len,
        config.chunking.bulk_min_chunk_len
    );
    println!(
        "  Chat:             window {}, retrieval limit {}, max_tokens {}, temperature {}",
        config.chat.window_size,
        config.chat.retrieval_limit,
        config.chat.max_tokens,
        config.chat.temperature
    );
    println!(
        "  Call timeout:     {}s",
        config.chat.call_timeout_secs
    );
    println!(
        "  Comparison model: {}",
        config.comparison_model.as_deref().unwrap_or("none")
    );

    println!();
    if provider_registry.is_empty() {
        println!("  Providers: none configured");
        println!();
        println!("  Set GROQ_API_KEY or HUGGINGFACE_API_KEY, or add a");
        println!("  [providers.*] table to the config file.");
    } else {
        println!("  Providers (priority order):");
        for (i, entry) in provider_registry.entries().iter().enumerate() {
            let marker = if i == 0 { "primary" } else { "fallback" };
            println!(
                "    {:<14} {marker:<9} model: {}",
                entry.id, entry.default_model
            );
        }
    }

    Ok(())
}
