//! Candidate Persistence
//!
//! Keeps the configured object locations across restarts as
//! `{"eggs": [[x, y, z], ...]}`.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::location::ObjectLocation;

/// On-disk shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCandidates {
    #[serde(default)]
    eggs: Vec<ObjectLocation>,
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// File contents are not a candidate list.
    #[error("corrupt candidate store {path}: {source}")]
    Corrupt {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// JSON file holding the candidate set.
#[derive(Debug, Clone)]
pub struct CandidateStore {
    path: PathBuf,
}

impl CandidateStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the candidate set. A missing file is an empty set, written back
    /// so the file exists from then on.
    pub async fn load(&self) -> Result<Vec<ObjectLocation>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let stored: StoredCandidates = serde_json::from_slice(&bytes)
                    .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
                info!("Loaded {} candidates from {}", stored.eggs.len(), self.path.display());
                Ok(stored.eggs)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No candidate store at {}, creating", self.path.display());
                self.save(&[]).await?;
                Ok(Vec::new())
            }
            Err(source) => Err(StoreError::Io { path: self.path.clone(), source }),
        }
    }

    /// Persist the candidate set.
    ///
    /// Writes a sibling temp file and renames it over the store, so a failed
    /// write leaves the previous contents intact.
    pub async fn save(&self, candidates: &[ObjectLocation]) -> Result<(), StoreError> {
        let stored = StoredCandidates { eggs: candidates.to_vec() };
        let bytes = serde_json::to_vec_pretty(&stored)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}
