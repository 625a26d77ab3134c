//! File storage for deliverables.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: &[u8], mime_type: &str) -> Result<StoredObject>;
    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Writes objects under a directory and serves them from `public_url/<key>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.contains("..");
        if !valid {
            bail!("invalid object key '{key}'");
        }
        Ok(self.root.join(key))
    }
}

/// Keeps ASCII letters, digits, dots, dashes and underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.').replace("..", "_");
    if cleaned.is_empty() { "file".to_string() } else { cleaned }
}

/// Guess a mime type from the file extension.
pub fn mime_for(file_name: &str) -> mime::Mime {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("txt" | "md") => mime::TEXT_PLAIN,
        Some("csv") => mime::TEXT_CSV,
        Some("json") => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn upload(&self, file_name: &str, bytes: &[u8], mime_type: &str) -> Result<StoredObject> {
        let key = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let path = self.path_for(&key)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create storage dir {}", self.root.display()))?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(%key, size = bytes.len(), mime_type, "stored object");
        Ok(StoredObject {
            url: format!("{}/{}", self.public_url, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(%key, "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(%key, "object already absent");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080/files/");

        let object = storage.upload("plans/Floor Plan.pdf", b"%PDF-1.7", "application/pdf").await.unwrap();
        assert!(object.key.ends_with("-Floor_Plan.pdf"));
        assert_eq!(object.url, format!("http://localhost:8080/files/{}", object.key));
        assert_eq!(std::fs::read(dir.path().join(&object.key)).unwrap(), b"%PDF-1.7");

        storage.delete(&object.key).await.unwrap();
        assert!(!dir.path().join(&object.key).exists());
        // Second delete is a no-op
        storage.delete(&object.key).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_keys_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost");
        assert!(storage.delete("../secret").await.is_err());
        assert!(storage.delete("a/b").await.is_err());
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("Fachada Norte (v2).dwg"), "Fachada_Norte__v2_.dwg");
        assert_eq!(sanitize_file_name(".."), "file");
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for("render.PNG"), mime::IMAGE_PNG);
        assert_eq!(mime_for("model.ifc"), mime::APPLICATION_OCTET_STREAM);
    }
}
