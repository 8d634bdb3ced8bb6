//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::Document;
use pagesplit::fixtures;

/// Write a PDF whose page N shows "Page N" into `dir`.
pub fn write_pdf(dir: &Path, name: &str, page_count: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixtures::pdf_with_pages(page_count).unwrap()).unwrap();
    path
}

/// Write the three-page manual with a nested page tree and cross-page links.
pub fn write_manual(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixtures::manual_with_links().unwrap()).unwrap();
    path
}

/// Decompressed content of the single page in `path`.
pub fn only_page_content(path: &Path) -> Vec<u8> {
    let doc = Document::load(path).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "{} should hold one page", path.display());
    doc.get_page_content(pages[&1]).unwrap()
}
