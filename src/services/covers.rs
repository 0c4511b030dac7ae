//! Storage for uploaded book cover images
//!
//! Only the generated file name reaches the catalog; files are never removed
//! when a book is deleted, only when the write that uploaded them fails.

use std::path::PathBuf;

use chrono::Utc;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CoverStorage {
    dir: PathBuf,
}

impl CoverStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` under a unique name and return that name
    pub async fn store(&self, original_name: Option<&str>, bytes: &[u8]) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;

        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name.unwrap_or_default())
        );

        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cover image: {}", e)))?;

        tracing::debug!(file_name = %file_name, size = bytes.len(), "Cover image stored");
        Ok(file_name)
    }

    /// Remove a cover written by [`CoverStorage::store`] whose book write failed
    pub async fn discard(&self, file_name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(file_name, error = %e, "Failed to remove cover image");
        }
    }
}

/// Last path component of `name`, restricted to a safe character set
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "cover".to_string()
    } else {
        cleaned.to_string()
    }
}
