//! Local file storage for assignment attachments and submissions.
//!
//! Writes are two-phase from the caller's point of view: the file is saved
//! here first and the database row referencing the key is only inserted once
//! the save has succeeded.

use std::path::PathBuf;

use tokio::fs;

use crate::utils::errors::AppError;

#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".to_string());
        Self::new(PathBuf::from(root))
    }

    /// Save file content under `key` and return the key.
    ///
    /// Keys are relative paths like `submissions/<uuid>/<filename>`; path
    /// traversal segments are rejected.
    pub async fn save(&self, key: &str, content: &[u8]) -> Result<String, AppError> {
        Self::validate_key(key)?;

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create upload directory: {}", e)))?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to write file: {}", e)))?;

        Ok(key.to_string())
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        Self::validate_key(key)?;

        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(anyhow::anyhow!(
                "Failed to delete file: {}",
                e
            ))),
        }
    }

    fn validate_key(key: &str) -> Result<(), AppError> {
        let valid = !key.is_empty()
            && !key.starts_with('/')
            && key.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..");

        if valid {
            Ok(())
        } else {
            Err(AppError::bad_request(anyhow::anyhow!(
                "Invalid storage key"
            )))
        }
    }
}
