// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offline card batch generation.
//!
//! Each card is rendered, uploaded, then registered in the card store.
//! Cards are processed one at a time; a failure is logged and the batch
//! moves on to the next card.

pub mod render;
pub mod upload;

pub use render::CardRenderer;
pub use upload::{DirectoryUploader, ImageUploader, MockUploader};

use crate::config::redemption_url;
use crate::db::{CardStore, StoreError};
use crate::models::{CardId, NewCard};
use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("QR code generation failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("card store error: {0}")]
    Store(#[from] StoreError),

    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// One card to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardJob {
    pub card_number: u32,
    pub recipient_name: String,
}

/// Build jobs for `count` cards starting at `start`. `recipients[i]` names
/// card `start + i`; missing or blank names get the default.
pub fn plan_jobs(start: u32, count: u32, recipients: &[String]) -> Vec<CardJob> {
    (0..count)
        .filter_map(|i| start.checked_add(i).map(|n| (i as usize, n)))
        .map(|(i, card_number)| CardJob {
            card_number,
            recipient_name: crate::models::card::recipient_or_default(
                recipients.get(i).map(String::as_str),
                card_number,
            ),
        })
        .collect()
}

/// Read recipient names, one per line. Blank lines are kept so that line
/// positions stay aligned with card numbers.
pub async fn load_recipients(path: &Path) -> Result<Vec<String>, GenerateError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(contents.lines().map(|l| l.trim().to_string()).collect())
}

/// Result of one successfully generated card.
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    pub card_number: u32,
    pub image_path: PathBuf,
    pub image_url: String,
    /// `None` in dry-run mode.
    pub card_id: Option<CardId>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub generated: Vec<GeneratedCard>,
    /// Card number and error message for each failed card.
    pub failed: Vec<(u32, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct BatchGenerator {
    renderer: Arc<CardRenderer>,
    uploader: Box<dyn ImageUploader>,
    /// Without a store the batch only renders and uploads.
    store: Option<Arc<dyn CardStore>>,
    retry: RetryPolicy,
    output_dir: PathBuf,
    site_base_url: String,
}

impl BatchGenerator {
    pub fn new(
        renderer: CardRenderer,
        uploader: Box<dyn ImageUploader>,
        output_dir: impl Into<PathBuf>,
        site_base_url: impl Into<String>,
    ) -> Self {
        Self {
            renderer: Arc::new(renderer),
            uploader,
            store: None,
            retry: RetryPolicy::default(),
            output_dir: output_dir.into(),
            site_base_url: site_base_url.into(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn CardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Render, upload and register one card.
    pub async fn generate_one(&self, job: &CardJob) -> Result<GeneratedCard, GenerateError> {
        let url = redemption_url(&self.site_base_url, job.card_number);

        // Rendering and PNG encoding are CPU-bound and write to disk.
        let image_path = {
            let renderer = Arc::clone(&self.renderer);
            let output_dir = self.output_dir.clone();
            let card_number = job.card_number;
            let url = url.clone();
            tokio::task::spawn_blocking(move || {
                renderer.render_to_file(card_number, &url, &output_dir)
            })
            .await??
        };
        tracing::info!(
            card_number = job.card_number,
            path = %image_path.display(),
            "Card image generated"
        );

        let image_url = self.uploader.upload(&image_path, job.card_number).await?;

        let card_id = match &self.store {
            Some(store) => {
                let new_card = NewCard::new(
                    job.card_number,
                    Some(&job.recipient_name),
                    url,
                    image_url.clone(),
                );
                let id = self.register(store.as_ref(), &new_card).await?;
                tracing::info!(card_number = job.card_number, card_id = %id, "Card added to store");
                Some(id)
            }
            None => None,
        };

        Ok(GeneratedCard {
            card_number: job.card_number,
            image_path,
            image_url,
            card_id,
        })
    }

    /// Create the store record, retrying only timeouts.
    async fn register(
        &self,
        store: &dyn CardStore,
        new_card: &NewCard,
    ) -> Result<CardId, GenerateError> {
        let id = self
            .retry
            .run(move |_attempt| store.create(new_card), StoreError::is_timeout)
            .await?;
        Ok(id)
    }

    /// Process every job in order and summarize.
    pub async fn run(&self, jobs: &[CardJob]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        tracing::info!(
            count = jobs.len(),
            uploader = self.uploader.name(),
            dry_run = self.store.is_none(),
            "Generating cards"
        );

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            tracing::error!(
                error = %e,
                path = %self.output_dir.display(),
                "Cannot create output directory"
            );
            summary.failed = jobs
                .iter()
                .map(|job| (job.card_number, e.to_string()))
                .collect();
            return summary;
        }

        for job in jobs {
            tracing::info!(
                card_number = job.card_number,
                recipient = %job.recipient_name,
                "Generating card"
            );
            match self.generate_one(job).await {
                Ok(card) => summary.generated.push(card),
                Err(e) => {
                    tracing::error!(card_number = job.card_number, error = %e, "Failed to process card");
                    summary.failed.push((job.card_number, e.to_string()));
                }
            }
        }

        tracing::info!(
            generated = summary.generated.len(),
            failed = summary.failed.len(),
            "Card generation finished"
        );
        summary
    }
}
