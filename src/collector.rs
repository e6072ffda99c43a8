//! Folder collection with per-file failure containment.
//!
//! Reads every eligible text file out of a folder. A file that cannot be
//! read does not abort the scan; it is recorded with its reason so the
//! ingestion summary can report it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::types::IngestError;

/// Extensions read by default, lowercase without the dot.
const DEFAULT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A file that was read successfully.
#[derive(Debug, Clone)]
pub struct CollectedFile {
    pub filename: String,
    pub path: PathBuf,
    pub contents: String,
}

/// A file that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Outcome of scanning a folder: readable files plus contained failures.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub files: Vec<CollectedFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Filtered directory reader.
#[derive(Debug, Clone)]
pub struct FileCollector {
    extensions: Vec<String>,
}

impl FileCollector {
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn with_extensions(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().to_lowercase())
                .collect(),
        }
    }

    /// Reads every matching file under `folder` (non-recursive).
    ///
    /// Files that fail to read or decode land in `skipped` with a reason
    /// and are logged at `warn`; the rest of the scan continues. Results
    /// are ordered by filename so downstream batches are stable across
    /// runs.
    pub async fn collect(&self, folder: &Path) -> Result<CollectionOutcome, IngestError> {
        let mut entries = fs::read_dir(folder).await?;
        let mut outcome = CollectionOutcome::default();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if !self.matches_extension(&path) {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();

            match fs::read_to_string(&path).await {
                Ok(contents) => outcome.files.push(CollectedFile {
                    filename,
                    path,
                    contents,
                }),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable file");
                    outcome.skipped.push(SkippedFile {
                        filename,
                        reason: err.to_string(),
                    });
                }
            }
        }

        outcome.files.sort_by(|a, b| a.filename.cmp(&b.filename));
        outcome.skipped.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(outcome)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new()
    }
}
