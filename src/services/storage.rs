use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

/// Reference to a stored file: a URL clients can fetch and the path
/// needed to delete it again.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub path: String,
}

/// The file-storage collaborator. Uploaded agreements go through this
/// seam so tests can substitute a mock.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<StoredFile>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}

/// Local-disk implementation: files land under
/// `<root>/agreements/<millis>-<name>` and are served from `<base_url>/files/`.
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

// Keep only characters that are safe in a path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<StoredFile> {
        let unique_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );
        let rel_path = format!("agreements/{unique_name}");

        let full_path = self.root.join(&rel_path);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, bytes).await?;

        tracing::info!(path = %rel_path, size = bytes.len(), "stored agreement file");

        Ok(StoredFile {
            url: format!("{}/files/{rel_path}", self.base_url),
            path: rel_path,
        })
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        tokio::fs::remove_file(self.root.join(path)).await?;
        tracing::info!(path = %path, "deleted stored file");
        Ok(())
    }
}
