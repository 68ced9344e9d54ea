// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card image hosting.

use super::{render::card_file_name, GenerateError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Default public base for [`MockUploader`].
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://example.com/favor-cards";

/// Publishes a rendered card image and returns its public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, image_path: &Path, card_number: u32) -> Result<String, GenerateError>;
}

/// Transfers nothing; reports the URL the image would have under `base_url`.
#[derive(Debug, Clone)]
pub struct MockUploader {
    base_url: String,
}

impl MockUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL)
    }
}

#[async_trait]
impl ImageUploader for MockUploader {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload(&self, _image_path: &Path, card_number: u32) -> Result<String, GenerateError> {
        tracing::info!(card_number, "[Mock] Uploading card image");
        Ok(format!("{}/{}", self.base_url, card_file_name(card_number)))
    }
}

/// Copies images into a directory the web server exposes under `/cards`.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
    public_base: String,
}

impl DirectoryUploader {
    /// `site_base_url` is the public root of the redemption site.
    pub fn new(dir: impl Into<PathBuf>, site_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base: format!("{}/cards", site_base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl ImageUploader for DirectoryUploader {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn upload(&self, image_path: &Path, card_number: u32) -> Result<String, GenerateError> {
        let file_name = card_file_name(card_number);
        let dest = self.dir.join(&file_name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::copy(image_path, &dest).await.map_err(|e| {
            GenerateError::Upload(format!(
                "copy {} to {}: {}",
                image_path.display(),
                dest.display(),
                e
            ))
        })?;

        tracing::debug!(card_number, dest = %dest.display(), "Card image copied");
        Ok(format!("{}/{}", self.public_base, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_uploader_url() {
        let uploader = MockUploader::default();
        let url = uploader.upload(Path::new("unused.png"), 12).await.unwrap();
        assert_eq!(url, "https://example.com/favor-cards/card-12.png");

        let uploader = MockUploader::new("https://cdn.test/");
        let url = uploader.upload(Path::new("unused.png"), 1).await.unwrap();
        assert_eq!(url, "https://cdn.test/card-1.png");
    }

    #[tokio::test]
    async fn test_directory_uploader_copies() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let image = src.path().join("card-4.png");
        std::fs::write(&image, b"png bytes").unwrap();

        let uploader = DirectoryUploader::new(dest.path().join("cards"), "https://cards.test/");
        let url = uploader.upload(&image, 4).await.unwrap();

        assert_eq!(url, "https://cards.test/cards/card-4.png");
        let copied = std::fs::read(dest.path().join("cards/card-4.png")).unwrap();
        assert_eq!(copied, b"png bytes");
    }

    #[tokio::test]
    async fn test_directory_uploader_missing_source() {
        let dest = tempfile::tempdir().unwrap();
        let uploader = DirectoryUploader::new(dest.path(), "http://localhost:8080");
        let err = uploader
            .upload(Path::new("/nonexistent/card-9.png"), 9)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Upload(_)));
    }
}
