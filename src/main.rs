use anyhow::{Context, Result};
use tracing::info;
use word_translation::{Config, ResolutionEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("word_translation=info".parse()?),
        )
        .init();

    let words: Vec<String> = std::env::args().skip(1).collect();
    if words.is_empty() {
        anyhow::bail!("Usage: word-translation <word>...");
    }

    // Load configuration from environment
    let config = Config::from_env()?;
    let engine = ResolutionEngine::from_config(&config)?;

    for word in &words {
        let record = engine.resolve_word(word).await;

        let json = serde_json::to_string_pretty(&record)
            .with_context(|| format!("Failed to serialize record for '{}'", word))?;
        println!("{}", json);
        println!("{}", record.translation_summary());

        if record.is_found() {
            info!("{} [{}] resolved", record.word, record.source);
        } else {
            info!("{}: no translation available", record.word);
        }
    }

    let report = engine.metrics().report();
    info!(
        "Done: {} lookups, {} cache hits, {} provider calls ({} failed), {} not found",
        report.cache_hits + report.cache_misses,
        report.cache_hits,
        report.provider_calls,
        report.provider_failures,
        report.not_found
    );

    Ok(())
}
