//! Whole-table persistence of the dataset.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::{Dataset, Listing};

#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// The stored dataset, empty when nothing has been saved yet
    async fn load(&self) -> Result<Dataset, StoreError>;

    /// Replace the stored dataset with `records`, in the given order
    async fn save(&self, records: &[Listing]) -> Result<(), StoreError>;
}

/// Pretty-printed JSON array on disk. Saves go through a temporary file and a
/// rename, so a reader sees either the old table or the new one.
pub struct JsonFileStore {
    path: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: None,
        }
    }

    /// Also keep a timestamped copy of every save in `dir`
    pub fn with_backups(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Unavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// `dataset_<timestamp>.json`, numbered when a save in the same second
    /// already took the name
    async fn write_backup(dir: &Path, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let mut backup = dir.join(format!("dataset_{stamp}.json"));
        let mut n = 1;
        while tokio::fs::try_exists(&backup)
            .await
            .map_err(|e| Self::unavailable(&backup, e))?
        {
            n += 1;
            backup = dir.join(format!("dataset_{stamp}_{n}.json"));
        }
        Self::write_atomic(&backup, bytes).await?;
        Ok(backup)
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::unavailable(path, e))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| Self::unavailable(path, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| Self::unavailable(path, e))
    }
}

#[async_trait]
impl DatasetStore for JsonFileStore {
    async fn load(&self) -> Result<Dataset, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No dataset at {}, starting empty", self.path.display());
                return Ok(Dataset::new());
            }
            Err(e) => return Err(Self::unavailable(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Dataset::new());
        }

        let records: Vec<Listing> =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(Dataset::from_records(records))
    }

    async fn save(&self, records: &[Listing]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        Self::write_atomic(&self.path, json.as_bytes()).await?;
        info!("💾 Saved {} listings to {}", records.len(), self.path.display());

        // the dataset is already in place, a failed backup only warns
        if let Some(dir) = &self.backup_dir {
            match Self::write_backup(dir, json.as_bytes()).await {
                Ok(backup) => info!("💾 Backup written to {}", backup.display()),
                Err(e) => warn!("Backup skipped: {}", e),
            }
        }
        Ok(())
    }
}
