//! File intake - durable storage for uploaded pet images.
//!
//! Stored names never derive from the client's file name (only its
//! extension survives), so two uploads of `cat.png` cannot overwrite each
//! other. Files are opened with `create_new` and synced before the locator
//! is handed back.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::MAX_EXTENSION_LENGTH;
use crate::domain::ImageLocator;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Persists uploaded binaries and returns a stable locator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileIntake: Send + Sync {
    /// Durably write `bytes`; the locator is valid once this returns.
    async fn store(&self, bytes: &[u8], original_name: &str) -> AppResult<ImageLocator>;

    /// Remove a previously stored binary.
    async fn discard(&self, locator: &ImageLocator) -> AppResult<()>;
}

/// Filesystem-backed intake rooted at the upload directory.
#[derive(Debug, Clone)]
pub struct DiskIntake {
    root: PathBuf,
}

impl DiskIntake {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory uploads are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| intake_error(&self.root, e))
    }

    /// Resolve a locator to its path on disk.
    pub fn path_of(&self, locator: &ImageLocator) -> PathBuf {
        self.root.join(locator.as_str())
    }
}

#[async_trait]
impl FileIntake for DiskIntake {
    async fn store(&self, bytes: &[u8], original_name: &str) -> AppResult<ImageLocator> {
        let locator = ImageLocator::parse(stored_name(original_name))?;
        let path = self.path_of(&locator);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| intake_error(&path, e))?;

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), "Failed to remove partial upload: {}", cleanup);
            }
            return Err(intake_error(&path, e));
        }

        tracing::debug!(locator = %locator, size = bytes.len(), "Stored upload");
        Ok(locator)
    }

    async fn discard(&self, locator: &ImageLocator) -> AppResult<()> {
        let path = self.path_of(locator);
        fs::remove_file(&path)
            .await
            .map_err(|e| intake_error(&path, e))
    }
}

/// `<unix millis>-<random>.<ext>`; the timestamp keeps names ordered, the
/// random suffix separates uploads landing in the same millisecond.
fn stored_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..12];

    match sanitized_extension(original_name) {
        Some(ext) => format!("{}-{}.{}", millis, suffix, ext),
        None => format!("{}-{}", millis, suffix),
    }
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LENGTH)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

fn intake_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::intake(format!("{}: {}", path.display(), err))
}
