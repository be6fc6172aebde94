use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

/// Metadata for an upload written to disk; returned to the client as `file`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub original_name: String,
    /// Name under the upload directory, referenced by the assessment.
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
    pub path: PathBuf,
}

/// Directory that receives uploaded documents.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `bytes` as `<unix millis>-<uuid>-<original file name>`. The file
    /// is created exclusively, so an existing upload is never overwritten.
    pub async fn save(
        &self,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> std::io::Result<StoredFile> {
        tokio::fs::create_dir_all(&self.root).await?;

        let filename = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        let path = self.root.join(&filename);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());

        Ok(StoredFile {
            original_name: original_name.to_string(),
            filename,
            mime_type: mime_type.to_string(),
            size: bytes.len(),
            path,
        })
    }
}

/// Keeps only the final path component so a client cannot write outside the
/// upload directory.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => "document".to_string(),
        other => other.to_string(),
    }
}
