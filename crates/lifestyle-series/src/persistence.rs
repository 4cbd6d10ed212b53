// ABOUTME: Snapshot files for the sample store
// ABOUTME: JSON documents written atomically via a temporary file and rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::error::SeriesError;
use crate::sample::Sample;
use chrono::{DateTime, Utc};
use lifestyle_core::constants::telemetry::SNAPSHOT_FORMAT_VERSION;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// One series as stored in a snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSeries {
    /// Owning user
    pub owner: Uuid,
    /// Metric name
    pub metric: String,
    /// Samples, oldest first
    pub samples: Vec<Sample>,
}

/// Serializable copy of the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// File format version
    pub version: u32,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Every non-empty series
    pub series: Vec<PersistedSeries>,
}

impl StoreSnapshot {
    /// Snapshot of the given series taken now
    #[must_use]
    pub fn new(series: Vec<PersistedSeries>) -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            created_at: Utc::now(),
            series,
        }
    }

    /// Total samples across all series
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.series.iter().map(|series| series.samples.len()).sum()
    }
}

/// Location of the snapshot file on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Snapshot file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Final path of the snapshot
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the snapshot, replacing any previous file
    ///
    /// The document is written to a sibling temporary file, flushed, and then
    /// renamed over the target so a crash never leaves a truncated snapshot.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Io`] when the file cannot be written or renamed,
    /// or [`SeriesError::Snapshot`] when serialization fails.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<usize, SeriesError> {
        let bytes =
            serde_json::to_vec(snapshot).map_err(|e| SeriesError::Snapshot(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SeriesError::Io {
                context: "creating snapshot directory",
                source,
            })?;
        }

        let temp_path = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()
        };
        write().map_err(|source| SeriesError::Io {
            context: "writing snapshot",
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| SeriesError::Io {
            context: "replacing snapshot",
            source,
        })?;

        debug!(
            path = %self.path.display(),
            series = snapshot.series.len(),
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(bytes.len())
    }

    /// Read the snapshot, `None` when no file exists yet
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::Io`] when the file exists but cannot be read, or
    /// [`SeriesError::Snapshot`] when it is not a snapshot of a supported version.
    pub fn load(&self) -> Result<Option<StoreSnapshot>, SeriesError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot found, starting empty");
                return Ok(None);
            }
            Err(source) => {
                return Err(SeriesError::Io {
                    context: "reading snapshot",
                    source,
                })
            }
        };

        let snapshot: StoreSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| SeriesError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(SeriesError::Snapshot(format!(
                "unsupported version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }
}
