//! Headless host binary for stdin/stdout JSON communication.
//!
//! This binary reads `CommandEnvelope` messages as newline-delimited JSON
//! from stdin, dispatches them to the search endpoint or the interactive
//! session, and writes `ResponseEnvelope` and `EventEnvelope` messages to
//! stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use typeahead::host::stdio::run_stdio_bridge;
use typeahead::{SearchHost, TypeaheadConfig, load_corpus};

/// Typeahead search host speaking newline-delimited JSON on stdio.
#[derive(Parser)]
#[command(name = "typeahead-host", version, about)]
struct Cli {
    /// Path to TOML configuration file. Defaults to
    /// `~/.config/typeahead/config.toml` when that file exists.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON corpus file; overrides `corpus_path` from the config.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Enable fuzzy matching in the interactive session.
    #[arg(long)]
    fuzzy: bool,

    /// Start the session at this query with its first page preloaded.
    #[arg(short, long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("typeahead=info,typeahead_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => TypeaheadConfig::from_file(path)?,
        None => {
            let path = TypeaheadConfig::default_config_path();
            if path.exists() {
                TypeaheadConfig::from_file(&path)?
            } else {
                TypeaheadConfig::default()
            }
        }
    };
    if let Some(corpus) = cli.corpus {
        config.corpus_path = Some(corpus);
    }
    if cli.fuzzy {
        config.session.fuzzy = true;
    }

    let corpus = load_corpus(&config)?;
    let mut host = SearchHost::new(corpus.clone(), &config)?;
    if let Some(query) = cli.query.as_deref() {
        host = host.with_initial_query(query)?;
    }
    tracing::info!(documents = corpus.len(), "typeahead-host starting");

    run_stdio_bridge(host).await.map_err(|e| {
        tracing::error!(error = %e, "typeahead-host exited with error");
        anyhow::anyhow!("typeahead-host failed: {e}")
    })?;

    tracing::info!("typeahead-host shut down cleanly");
    Ok(())
}
