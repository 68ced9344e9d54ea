// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favor card batch generator
//!
//! Renders card images with redemption QR codes, publishes them, and
//! registers each card in the Notion card database.

use anyhow::{Context, Result};
use clap::Parser;
use favor_cards::config::{NotionConfig, DEFAULT_SITE_BASE_URL};
use favor_cards::db::NotionStore;
use favor_cards::generator::{
    load_recipients, plan_jobs, upload::DEFAULT_IMAGE_BASE_URL, BatchGenerator, CardRenderer,
    DirectoryUploader, ImageUploader, MockUploader,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate-cards")]
#[command(about = "Generate printable favor cards and register them in the card database")]
struct Cli {
    /// First card number
    #[arg(long, default_value_t = 1)]
    start: u32,

    /// Number of cards to generate
    #[arg(short, long, default_value_t = 100)]
    count: u32,

    /// Card template image
    #[arg(short, long, default_value = "./template.png")]
    template: PathBuf,

    /// Directory for rendered cards
    #[arg(short, long, default_value = "./generated-cards")]
    output_dir: PathBuf,

    /// Recipient names, one per line (line 1 is the first card)
    #[arg(short, long)]
    recipients: Option<PathBuf>,

    /// Copy images into this directory (served by the site under /cards)
    /// instead of reporting placeholder URLs
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Base URL reported for images when no upload directory is given
    #[arg(long, default_value = DEFAULT_IMAGE_BASE_URL)]
    image_base_url: String,

    /// Public base URL of the redemption site, encoded in each QR code
    #[arg(long, env = "SITE_BASE_URL", default_value = DEFAULT_SITE_BASE_URL)]
    site_base_url: String,

    /// Render and upload only; do not touch the card database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("favor_cards=info,generate_cards=info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Card generation aborted");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every card succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let renderer = CardRenderer::from_path(&cli.template)
        .with_context(|| format!("loading template {}", cli.template.display()))?;

    let recipients = match &cli.recipients {
        Some(path) => load_recipients(path)
            .await
            .with_context(|| format!("reading recipients from {}", path.display()))?,
        None => Vec::new(),
    };

    let uploader: Box<dyn ImageUploader> = match &cli.upload_dir {
        Some(dir) => Box::new(DirectoryUploader::new(dir, &cli.site_base_url)),
        None => Box::new(MockUploader::new(cli.image_base_url.clone())),
    };

    let mut generator =
        BatchGenerator::new(renderer, uploader, &cli.output_dir, cli.site_base_url.clone());

    if cli.dry_run {
        tracing::info!("Dry run: cards will not be added to the database");
    } else {
        let notion = NotionConfig::from_env()?;
        tracing::info!(database_id = %notion.database_id, "Using Notion card database");
        generator = generator.with_store(Arc::new(NotionStore::new(&notion)?));
    }

    let jobs = plan_jobs(cli.start, cli.count, &recipients);
    let summary = generator.run(&jobs).await;

    for (card_number, error) in &summary.failed {
        tracing::warn!(card_number, error = %error, "Card failed");
    }

    Ok(summary.is_success())
}
