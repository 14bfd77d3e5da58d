//! Local upload storage
//!
//! Files are saved as `<uuid-v4><original extension>` directly under the
//! upload directory. A reference is that bare file name and nothing else.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file reference: {0}")]
    InvalidReference(String),
}

#[derive(Debug, Clone)]
pub struct UploadStorage {
    base_dir: PathBuf,
}

impl UploadStorage {
    /// Creates the directory if it is missing
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `bytes` under a fresh name and return the reference
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let reference = format!("{}{}", uuid::Uuid::new_v4(), extension_of(original_name));
        let path = self.base_dir.join(&reference);

        if let Err(e) = tokio::fs::write(&path, bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        tracing::debug!(reference = %reference, bytes = bytes.len(), "Upload saved");
        Ok(reference)
    }

    pub async fn read(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(self.path_of(reference)?).await?)
    }

    pub async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        Ok(tokio::fs::remove_file(self.path_of(reference)?).await?)
    }

    /// Resolve a reference inside the upload directory
    pub fn path_of(&self, reference: &str) -> Result<PathBuf, StorageError> {
        validate_reference(reference)?;
        Ok(self.base_dir.join(reference))
    }
}

fn validate_reference(reference: &str) -> Result<(), StorageError> {
    let invalid = reference.is_empty()
        || reference.contains('/')
        || reference.contains('\\')
        || reference.contains("..")
        || reference.contains(':');
    if invalid {
        return Err(StorageError::InvalidReference(reference.to_string()));
    }
    Ok(())
}

/// `.ext` of the last path segment, empty when absent or not plain alphanumerics
fn extension_of(original_name: &str) -> String {
    let file_name = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 8
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("slip.png"), ".png");
        assert_eq!(extension_of("C:\\Users\\me\\IMG_0001.JPG"), ".JPG");
        assert_eq!(extension_of("photos/receipt.jpeg"), ".jpeg");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".hidden"), "");
        assert_eq!(extension_of("weird.p/ng"), "");
    }

    #[test]
    fn test_rejects_traversal_references() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path()).unwrap();

        for reference in ["", "../secret", "a/b.png", "a\\b.png", "..", "C:x.png"] {
            assert!(
                matches!(storage.path_of(reference), Err(StorageError::InvalidReference(_))),
                "{reference:?} should be rejected"
            );
        }
        assert_eq!(storage.path_of("abc.png").unwrap(), dir.path().join("abc.png"));
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path().join("uploads")).unwrap();
        assert!(storage.base_dir().is_dir());

        let reference = storage.save("slip.png", b"image-bytes").await.unwrap();
        assert!(reference.ends_with(".png"));
        assert_eq!(reference.len(), 36 + 4);
        assert_eq!(storage.read(&reference).await.unwrap(), b"image-bytes");

        storage.delete(&reference).await.unwrap();
        assert!(matches!(storage.read(&reference).await, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path()).unwrap();

        let first = storage.save("a.jpg", b"1").await.unwrap();
        let second = storage.save("a.jpg", b"2").await.unwrap();
        assert_ne!(first, second);
    }
}
