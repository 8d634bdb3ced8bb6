//! Output artifacts and the split report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Extension of every artifact.
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Stem used when the source path has none.
const FALLBACK_STEM: &str = "document";

/// Naming rule for single-page outputs: `{stem}_page_{n:03}.pdf`.
///
/// The stem is normalized to NFC so a file name that arrives decomposed
/// (as macOS stores Hangul, for instance) yields the same artifact names as
/// its composed spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    stem: String,
}

impl ArtifactName {
    /// Naming rule for outputs of `source`.
    pub fn for_source(source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_STEM.to_string());
        Self::from_stem(&stem)
    }

    /// Naming rule for an explicit stem.
    pub fn from_stem(stem: &str) -> Self {
        Self {
            stem: stem.nfc().collect(),
        }
    }

    /// The normalized stem.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// File name for the page at 0-based `index`.
    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{}_page_{:03}.{}",
            self.stem,
            index + 1,
            ARTIFACT_EXTENSION
        )
    }
}

/// A single-page PDF written by the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// 0-based index of the page in the source
    pub page_index: usize,

    /// 1-based page number
    pub page_number: u32,

    /// File name inside the output directory
    pub file_name: String,

    /// Full path of the written file
    pub path: PathBuf,

    /// Size of the written file
    pub bytes_written: u64,
}

/// Outcome of a successful split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    /// Source document
    pub source: PathBuf,

    /// Directory the artifacts were written to
    pub output_dir: PathBuf,

    /// Number of pages in the source
    pub page_count: u32,

    /// Written artifacts, in page order
    pub artifacts: Vec<OutputArtifact>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SplitReport {
    /// Paths of the written artifacts, in page order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }

    /// Consume the report, keeping only the artifact paths.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.artifacts.into_iter().map(|a| a.path).collect()
    }

    /// Number of artifacts written.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total bytes written across all artifacts.
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.bytes_written).sum()
    }

    /// Wall-clock duration of the split.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
