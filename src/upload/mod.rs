//! Temporary upload storage.
//!
//! An upload lives on disk only for the duration of its request. The
//! guard deletes the file when dropped, so every handler exit path
//! (success, validation failure, composition error) releases it exactly
//! once.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A temporary uploaded file, deleted on drop.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write `data` to a uniquely named file under `dir`, creating the
    /// directory if needed.
    pub async fn write(dir: &Path, data: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.pdf", Uuid::new_v4()));
        tokio::fs::write(&path, data).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        // Best-effort: a missing file at cleanup time is tolerated.
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_written_and_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::write(dir.path(), b"%PDF-1.5").await.unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");

        drop(upload);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_drop_tolerates_already_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::write(dir.path(), b"data").await.unwrap();
        std::fs::remove_file(upload.path()).unwrap();
        // Drop must not panic.
        drop(upload);
    }
}
