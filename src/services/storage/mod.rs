pub mod local;

use async_trait::async_trait;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `bytes` and return a durable reference URL.
    async fn store(&self, owner: &str, filename: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}

/// Keep only characters that are safe in a path segment and a URL.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
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
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
