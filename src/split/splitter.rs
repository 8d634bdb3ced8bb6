//! The page splitter.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::{ArtifactName, OutputArtifact, SourceDocument, SplitReport};

use super::options::SplitOptions;

/// Progress notifications emitted while splitting.
#[derive(Debug, Clone, Copy)]
pub enum SplitEvent<'a> {
    /// The source was parsed and the output directory exists.
    Started {
        /// Pages in the source
        total: u32,
        /// Pages that will be written
        selected: usize,
        output_dir: &'a Path,
    },
    /// One artifact is in place at its final path.
    PageWritten(&'a OutputArtifact),
    /// Every selected page was written.
    Finished { written: usize },
}

/// Splits a PDF into one single-page PDF per page.
///
/// Splitting is sequential: the source is opened once, then each page is
/// extracted, written and closed before the next one starts. If writing
/// page `k` fails, pages before it stay on disk unless
/// [`SplitOptions::atomic`] is set.
///
/// # Example
///
/// ```no_run
/// use pagesplit::{PageSplitter, SplitOptions};
///
/// let splitter = PageSplitter::new(SplitOptions::new().with_destination("out"));
/// let report = splitter.split("manual.pdf")?;
/// for path in report.paths() {
///     println!("{}", path.display());
/// }
/// # Ok::<(), pagesplit::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageSplitter {
    options: SplitOptions,
}

impl PageSplitter {
    /// Create a splitter with the given options.
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    /// The options this splitter runs with.
    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split `source` into single-page artifacts.
    pub fn split<P: AsRef<Path>>(&self, source: P) -> Result<SplitReport> {
        self.split_with_progress(source, |_| {})
    }

    /// Split `source`, reporting progress to `on_event`.
    ///
    /// No event is emitted after an error.
    pub fn split_with_progress<P, F>(&self, source: P, mut on_event: F) -> Result<SplitReport>
    where
        P: AsRef<Path>,
        F: FnMut(&SplitEvent<'_>),
    {
        let source = source.as_ref();
        let started_at = Utc::now();

        // Open before touching the destination so a bad source leaves no directories behind.
        let document = SourceDocument::open(source)?;
        let total = document.page_count();
        self.options.pages.validate(total)?;

        let output_dir = self.options.output_dir(source);
        let created_dir = !output_dir.exists();
        fs::create_dir_all(&output_dir).map_err(|e| Error::write(&output_dir, e))?;

        let names = ArtifactName::for_source(source);
        let selected: Vec<usize> = (0..total as usize)
            .filter(|&i| self.options.pages.includes(i as u32 + 1))
            .collect();

        log::info!(
            "splitting {} ({} pages, {} selected) into {}",
            source.display(),
            total,
            selected.len(),
            output_dir.display()
        );
        on_event(&SplitEvent::Started {
            total,
            selected: selected.len(),
            output_dir: &output_dir,
        });

        let artifacts = if self.options.atomic {
            match write_staged(&document, &names, &selected, &output_dir) {
                Ok(artifacts) => {
                    for artifact in &artifacts {
                        on_event(&SplitEvent::PageWritten(artifact));
                    }
                    artifacts
                }
                Err(e) => {
                    if created_dir {
                        if let Err(cleanup) = fs::remove_dir(&output_dir) {
                            log::debug!("could not remove {}: {}", output_dir.display(), cleanup);
                        }
                    }
                    return Err(e);
                }
            }
        } else {
            write_pages(&document, &names, &selected, &output_dir, &output_dir, &mut on_event)?
        };

        log::info!(
            "wrote {} of {} pages to {}",
            artifacts.len(),
            total,
            output_dir.display()
        );
        on_event(&SplitEvent::Finished {
            written: artifacts.len(),
        });

        Ok(SplitReport {
            source: source.to_path_buf(),
            output_dir,
            page_count: total,
            artifacts,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Write each selected page into `write_dir`.
///
/// Artifacts record their location under `final_dir`, which differs from
/// `write_dir` only while staging.
fn write_pages<F>(
    document: &SourceDocument,
    names: &ArtifactName,
    selected: &[usize],
    write_dir: &Path,
    final_dir: &Path,
    on_event: &mut F,
) -> Result<Vec<OutputArtifact>>
where
    F: FnMut(&SplitEvent<'_>),
{
    let total = document.page_count();
    let mut artifacts = Vec::with_capacity(selected.len());

    for &index in selected {
        let file_name = names.file_name(index);
        let bytes_written = write_page(document, index, &write_dir.join(&file_name))?;

        let artifact = OutputArtifact {
            page_index: index,
            page_number: index as u32 + 1,
            path: final_dir.join(&file_name),
            file_name,
            bytes_written,
        };
        log::info!(
            "page {}/{} written: {}",
            artifact.page_number,
            total,
            artifact.file_name
        );
        on_event(&SplitEvent::PageWritten(&artifact));
        artifacts.push(artifact);
    }

    Ok(artifacts)
}

/// Write every page into a hidden staging directory inside `output_dir`,
/// then move the files into place.
///
/// The staging directory is removed when it goes out of scope, so a failed
/// run leaves no new files visible. No progress events are emitted here;
/// the caller reports pages once they are published.
fn write_staged(
    document: &SourceDocument,
    names: &ArtifactName,
    selected: &[usize],
    output_dir: &Path,
) -> Result<Vec<OutputArtifact>> {
    let staging = tempfile::Builder::new()
        .prefix(".pagesplit-")
        .tempdir_in(output_dir)
        .map_err(|e| Error::write(output_dir, e))?;
    log::debug!("staging pages in {}", staging.path().display());

    let artifacts = write_pages(
        document,
        names,
        selected,
        staging.path(),
        output_dir,
        &mut |_: &SplitEvent<'_>| {},
    )?;

    // A rename cannot replace a directory; refuse before anything is published.
    if let Some(blocked) = artifacts.iter().find(|a| a.path.is_dir()) {
        return Err(Error::write(
            &blocked.path,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "a directory is in the way"),
        ));
    }

    for artifact in &artifacts {
        let staged: PathBuf = staging.path().join(&artifact.file_name);
        fs::rename(&staged, &artifact.path).map_err(|e| Error::write(&artifact.path, e))?;
    }

    Ok(artifacts)
}

/// Extract one page and write it to `path`. Returns the file size.
fn write_page(document: &SourceDocument, index: usize, path: &Path) -> Result<u64> {
    let mut single = document.extract_page(index)?;

    let mut buffer = Vec::new();
    single
        .save_to(&mut buffer)
        .map_err(|e| Error::Serialize {
            page: index as u32 + 1,
            message: e.to_string(),
        })?;

    let mut file = File::create(path).map_err(|e| Error::write(path, e))?;
    file.write_all(&buffer)
        .and_then(|_| file.flush())
        .map_err(|e| Error::write(path, e))?;

    Ok(buffer.len() as u64)
}
