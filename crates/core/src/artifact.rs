//! Artifact persistence.
//!
//! Writes downloaded image bytes verbatim to their destination path. Parent
//! directories are created as needed; an existing file is overwritten.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write artifact bytes to `path`, returning the byte count written.
pub async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<u64, ArtifactError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ArtifactError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    fs::write(path, bytes)
        .await
        .map_err(|e| ArtifactError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/portrait.png");

        let written = write_artifact(&path, b"png-bytes").await.unwrap();
        assert_eq!(written, 9);

        let on_disk = fs::read(&path).await.unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("portrait.png");
        fs::write(&path, b"old").await.unwrap();

        write_artifact(&path, b"new-bytes").await.unwrap();

        let on_disk = fs::read(&path).await.unwrap();
        assert_eq!(on_disk, b"new-bytes");
    }

    #[tokio::test]
    async fn test_write_bytes_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.bin");

        // Arbitrary binary, including NUL and high bytes
        let bytes: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
        let written = write_artifact(&path, &bytes).await.unwrap();
        assert_eq!(written, 256);

        let on_disk = fs::read(&path).await.unwrap();
        assert_eq!(on_disk, bytes);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_path() {
        let temp = TempDir::new().unwrap();
        // A file where a directory is expected makes create_dir_all fail
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"x").await.unwrap();
        let path = blocker.join("sub/portrait.png");

        let err = write_artifact(&path, b"data").await.unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::DirectoryCreationFailed { .. }
        ));
    }
}
