//! Split options and page selection.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Subdirectory created under the destination for the artifacts.
pub const DEFAULT_SUBDIR: &str = "separated_pages";

/// Options for splitting a document.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Where to create the output subdirectory (source's directory if unset)
    pub destination_dir: Option<PathBuf>,

    /// Name of the output subdirectory; empty writes straight into the destination
    pub subdir_name: String,

    /// Which pages to emit (1-indexed)
    pub pages: PageSelection,

    /// Write into a staging directory and move files into place only after
    /// every page succeeded
    pub atomic: bool,
}

impl SplitOptions {
    /// Create new split options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination directory.
    pub fn with_destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_dir = Some(dir.into());
        self
    }

    /// Set the output subdirectory name.
    pub fn with_subdir(mut self, name: impl Into<String>) -> Self {
        self.subdir_name = name.into();
        self
    }

    /// Write artifacts directly into the destination directory.
    pub fn flat(mut self) -> Self {
        self.subdir_name.clear();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Enable or disable staged writing.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Directory the artifacts of `source` end up in.
    pub fn output_dir(&self, source: &Path) -> PathBuf {
        let base = match &self.destination_dir {
            Some(dir) => dir.as_path(),
            None => source.parent().unwrap_or_else(|| Path::new("")),
        };

        if self.subdir_name.is_empty() {
            base.to_path_buf()
        } else {
            base.join(&self.subdir_name)
        }
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            destination_dir: None,
            subdir_name: DEFAULT_SUBDIR.to_string(),
            pages: PageSelection::All,
            atomic: false,
        }
    }
}

/// Page selection (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// A contiguous range of pages (inclusive)
    Range(RangeInclusive<u32>),
    /// Specific pages, in any order
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                check_bounds(start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                check_bounds(start, end)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page_number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }

    /// Check the selection fits a document of `page_count` pages.
    pub fn validate(&self, page_count: u32) -> Result<()> {
        let last = match self {
            PageSelection::All => return Ok(()),
            PageSelection::Range(range) => {
                check_bounds(*range.start(), *range.end())?;
                *range.end()
            }
            PageSelection::Pages(pages) => {
                if pages.contains(&0) {
                    return Err(Error::InvalidPageRange("pages are numbered from 1".into()));
                }
                match pages.iter().max() {
                    Some(&max) => max,
                    None => return Ok(()),
                }
            }
        };

        if last > page_count {
            return Err(Error::PageOutOfRange(last, page_count));
        }
        Ok(())
    }
}

fn parse_page_number(s: &str) -> Result<u32> {
    let s = s.trim();
    match s.parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageRange("pages are numbered from 1".into())),
        Ok(n) => Ok(n),
        Err(_) => Err(Error::InvalidPageRange(format!("invalid page number '{}'", s))),
    }
}

fn check_bounds(start: u32, end: u32) -> Result<()> {
    if start == 0 {
        return Err(Error::InvalidPageRange("pages are numbered from 1".into()));
    }
    if start > end {
        return Err(Error::InvalidPageRange(format!("{}-{} is reversed", start, end)));
    }
    Ok(())
}
