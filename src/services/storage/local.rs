use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use super::{sanitize_filename, FileStore};

/// Writes uploads into a directory that the router serves under `/uploads`.
pub struct LocalFileStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, owner: &str, filename: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", self.dir.display()))?;

        let name = format!(
            "{}_{}_{}",
            sanitize_filename(owner),
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );
        let path = self.dir.join(&name);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write upload {}", path.display()))?;

        tracing::info!(file = %name, "stored upload");
        Ok(format!("{}/uploads/{name}", self.public_base_url))
    }
}
