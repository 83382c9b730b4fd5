//! Blob storage for claim attachments.
//!
//! Stored files are addressed by `{bucket}/{millis}-{sanitized name}`; the
//! reference kept on the claim is that key prefixed with a public base URL.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use claimmate_core::{sanitize_filename, Error, Result};

/// Bucket that claim attachments are written under.
pub const CLAIM_FILES_BUCKET: &str = "claim-files";

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified path.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend rooted at a base directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        if path.split(['/', '\\']).any(|part| part == "..") || path.starts_with('/') {
            return Err(Error::Storage(format!("invalid storage path: {}", path)));
        }
        Ok(self.base_path.join(path))
    }

    /// Round-trip a small file so misconfigured directories fail at startup.
    pub async fn validate(&self) -> Result<()> {
        let check_key = ".health-check/check.bin";
        self.write(check_key, b"storage-health-check").await?;
        let data = self.read(check_key).await?;
        if data != b"storage-health-check" {
            return Err(Error::Storage("read-back mismatch".to_string()));
        }
        self.delete(check_key).await?;
        let _ = fs::remove_dir(self.base_path.join(".health-check")).await;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(storage_path = %path, size = data.len(), "file_storage: write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)?).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)?).await?)
    }
}

/// Storage key for a new attachment: `claim-files/{millis}-{name}`.
pub fn attachment_key(filename: &str) -> String {
    format!(
        "{}/{}-{}",
        CLAIM_FILES_BUCKET,
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// Reference recorded on a claim when no blob area is configured.
pub fn placeholder_reference(filename: &str) -> String {
    format!(
        "demo-file-{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// Public reference for a stored key.
pub fn public_reference(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("claim-files/1-a.txt", b"hello").await.unwrap();
        assert!(backend.exists("claim-files/1-a.txt").await.unwrap());
        assert_eq!(backend.read("claim-files/1-a.txt").await.unwrap(), b"hello");

        backend.delete("claim-files/1-a.txt").await.unwrap();
        assert!(!backend.exists("claim-files/1-a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        let err = backend.write("../escape.txt", b"x").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        FilesystemBackend::new(dir.path()).validate().await.unwrap();
    }

    #[test]
    fn test_attachment_key_format() {
        let key = attachment_key("../my bill.pdf");
        assert!(key.starts_with("claim-files/"));
        assert!(key.ends_with("-my_bill.pdf"));
    }

    #[test]
    fn test_placeholder_reference() {
        let reference = placeholder_reference("photo.png");
        assert!(reference.starts_with("demo-file-"));
        assert!(reference.ends_with("-photo.png"));
    }

    #[test]
    fn test_public_reference() {
        assert_eq!(
            public_reference("/files/", "claim-files/1-a.txt"),
            "/files/claim-files/1-a.txt"
        );
    }
}
