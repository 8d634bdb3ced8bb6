//! # pagesplit
//!
//! Split PDF documents into one single-page PDF per page.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pagesplit::Result<()> {
//!     // Writes manual_page_001.pdf, manual_page_002.pdf, ... into
//!     // ./separated_pages next to the source.
//!     let report = pagesplit::split_file("manual.pdf", None::<&str>)?;
//!     println!("{} pages written to {}", report.len(), report.output_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Deterministic names**: `{stem}_page_{n:03}.pdf`, 1-based
//! - **Page selection**: emit only `1-10` or `1,3,5`
//! - **Staged writes**: optionally publish outputs only after every page succeeded
//! - **Chat client** (`chat` feature): Azure OpenAI "on your data" REPL backend

pub mod detect;
pub mod error;
pub mod model;
pub mod split;

#[cfg(feature = "chat")]
pub mod chat;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, ErrorKind, Result};
pub use model::{ArtifactName, DocumentInfo, OutputArtifact, SourceDocument, SplitReport};
pub use split::{PageSelection, PageSplitter, SplitEvent, SplitOptions, DEFAULT_SUBDIR};

#[doc(hidden)]
pub use model::fixtures;

use std::path::{Path, PathBuf};

/// Split a PDF file into single-page PDFs.
///
/// Outputs go to `destination_dir/separated_pages`, or to
/// `separated_pages` next to the source when no destination is given.
///
/// # Example
///
/// ```no_run
/// use pagesplit::split_file;
///
/// let report = split_file("manual.pdf", Some("out")).unwrap();
/// assert_eq!(report.len() as u32, report.page_count);
/// ```
pub fn split_file<P, Q>(source: P, destination_dir: Option<Q>) -> Result<SplitReport>
where
    P: AsRef<Path>,
    Q: Into<PathBuf>,
{
    let mut options = SplitOptions::new();
    if let Some(dir) = destination_dir {
        options = options.with_destination(dir);
    }
    split_file_with_options(source, options)
}

/// Split a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pagesplit::{split_file_with_options, PageSelection, SplitOptions};
///
/// let options = SplitOptions::new()
///     .with_pages(PageSelection::parse("1-3").unwrap())
///     .atomic(true);
/// let report = split_file_with_options("manual.pdf", options).unwrap();
/// ```
pub fn split_file_with_options<P: AsRef<Path>>(source: P, options: SplitOptions) -> Result<SplitReport> {
    PageSplitter::new(options).split(source)
}

/// Split a PDF file, returning the written paths or nothing.
///
/// Any error is logged and turned into an empty list. Pages written before
/// the failure stay on disk. Prefer [`split_file`] when the cause matters.
pub fn separate_pdf_pages<P, Q>(source: P, destination_dir: Option<Q>) -> Vec<PathBuf>
where
    P: AsRef<Path>,
    Q: Into<PathBuf>,
{
    let source = source.as_ref();
    match split_file(source, destination_dir) {
        Ok(report) => report.into_paths(),
        Err(e) => {
            log::warn!("failed to split {}: {}", source.display(), e);
            Vec::new()
        }
    }
}

/// Read page count and Info-dictionary details of a PDF file.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<DocumentInfo> {
    Ok(SourceDocument::open(path)?.info())
}

/// Split a PDF file on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn split_file_async(source: PathBuf, options: SplitOptions) -> Result<SplitReport> {
    tokio::task::spawn_blocking(move || split_file_with_options(source, options))
        .await
        .map_err(|e| Error::Other(format!("split task failed: {}", e)))?
}
