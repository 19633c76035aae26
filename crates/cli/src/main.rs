//! Portray CLI
//!
//! Batch-submits portrait generation jobs to the configured inference queue,
//! polls them to completion and writes the images to disk.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portray_core::{
    load_config, resolve_credential, validate_config, BatchRunner, FalQueueClient, QueueClient,
    SubjectCatalog,
};

#[derive(Parser)]
#[command(name = "portray")]
#[command(about = "Batch portrait generation via a queue-based inference API", long_about = None)]
struct Cli {
    /// Subject identifiers to generate; all known subjects when omitted
    subjects: Vec<String>,

    /// Configuration file
    #[arg(long, env = "PORTRAY_CONFIG", default_value = "portray.toml")]
    config: PathBuf,

    /// Queue API credential; falls back to FAL_KEY or the env file
    #[arg(long)]
    key: Option<String>,

    /// Env file consulted when no credential is given otherwise
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Override the configured output root directory
    #[arg(long)]
    output_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    if let Some(output_root) = cli.output_root {
        config.batch.output_root = output_root;
    }

    // Credential discovery is the only remaining fatal step; it runs before
    // any network activity.
    let credential =
        resolve_credential(cli.key, &cli.env_file).context("Credential discovery failed")?;

    let catalog = SubjectCatalog::from_config(&config.catalog);
    if cli.subjects.is_empty() {
        info!("Generating all {} known subjects", catalog.len());
    } else {
        info!(
            "Generating {} of {} known subjects",
            cli.subjects.len(),
            catalog.len()
        );
    }

    let client: Arc<dyn QueueClient> =
        Arc::new(FalQueueClient::new(config.queue.clone(), credential));
    let runner = BatchRunner::new(config.batch.clone(), client);

    let report = runner.run(&catalog, &cli.subjects).await;

    if !report.all_succeeded() {
        // Partial failure is reflected in the exit code, not raised
        std::process::exit(1);
    }

    Ok(())
}
