//! Integration tests for the page splitter.

mod common;

use std::fs;

use lopdf::Document;
use pagesplit::{
    split_file, Error, ErrorKind, PageSelection, PageSplitter, SourceDocument, SplitOptions,
};

#[test]
fn test_split_produces_one_artifact_per_page_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "manual.pdf", 12);

    let report = split_file(&source, Some(dir.path().join("out"))).unwrap();

    assert_eq!(report.page_count, 12);
    assert_eq!(report.len(), 12);
    for (i, artifact) in report.artifacts.iter().enumerate() {
        assert_eq!(artifact.page_index, i);
        assert_eq!(artifact.page_number as usize, i + 1);
    }
    assert_eq!(report.artifacts[0].file_name, "manual_page_001.pdf");
    assert_eq!(report.artifacts[11].file_name, "manual_page_012.pdf");
    assert_eq!(
        report.artifacts[11].path,
        dir.path().join("out/separated_pages/manual_page_012.pdf")
    );
}

#[test]
fn test_each_artifact_round_trips_its_page() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = common::write_pdf(dir.path(), "doc.pdf", 5);
    let source = SourceDocument::open(&source_path).unwrap();

    let report = split_file(&source_path, None::<&str>).unwrap();

    for artifact in &report.artifacts {
        let content = common::only_page_content(&artifact.path);
        assert_eq!(content, source.page_content(artifact.page_index).unwrap());
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains(&format!("Page {}", artifact.page_number)));
    }
}

#[test]
fn test_artifacts_keep_inherited_resources() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 2);

    let report = split_file(&source, None::<&str>).unwrap();

    // Page 2 inherits Resources and MediaBox from the page tree.
    let doc = Document::load(&report.artifacts[1].path).unwrap();
    let page_id = doc.get_pages()[&1];
    let page = doc.get_dictionary(page_id).unwrap();
    assert!(page.has(b"Resources"));
    assert!(page.has(b"MediaBox"));
}

#[test]
fn test_rerun_overwrites_with_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 3);

    let first = split_file(&source, None::<&str>).unwrap();
    let before: Vec<Vec<u8>> = first.paths().iter().map(|p| fs::read(p).unwrap()).collect();

    let second = split_file(&source, None::<&str>).unwrap();
    let after: Vec<Vec<u8>> = second.paths().iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(first.paths(), second.paths());
    assert_eq!(before, after);
}

#[test]
fn test_empty_document_yields_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "empty.pdf", 0);

    let report = split_file(&source, None::<&str>).unwrap();

    assert_eq!(report.page_count, 0);
    assert!(report.is_empty());
}

#[test]
fn test_missing_source_is_not_found_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out");

    let err = split_file(dir.path().join("missing.pdf"), Some(&destination)).unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!destination.exists());
}

#[test]
fn test_garbage_source_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.pdf");
    fs::write(&source, b"this was never a PDF").unwrap();

    let err = split_file(&source, None::<&str>).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(!dir.path().join("separated_pages").exists());
}

#[test]
fn test_unwritable_destination_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 2);
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, b"occupied").unwrap();

    let err = split_file(&source, Some(&blocker)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Write);
}

#[test]
fn test_write_failure_keeps_earlier_pages() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 3);
    let output_dir = dir.path().join("separated_pages");
    // A directory squatting on page 2's name makes that write fail.
    fs::create_dir_all(output_dir.join("doc_page_002.pdf")).unwrap();

    let err = split_file(&source, None::<&str>).unwrap_err();

    assert!(matches!(err, Error::Write { .. }));
    assert!(output_dir.join("doc_page_001.pdf").is_file());
    assert!(!output_dir.join("doc_page_003.pdf").exists());
}

#[test]
fn test_page_selection_and_flat_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 6);
    let out = dir.path().join("flat");

    let options = SplitOptions::new()
        .with_destination(&out)
        .flat()
        .with_pages(PageSelection::parse("2,4-5").unwrap());
    let report = PageSplitter::new(options).split(&source).unwrap();

    let names: Vec<_> = report.artifacts.iter().map(|a| a.file_name.clone()).collect();
    assert_eq!(names, ["doc_page_002.pdf", "doc_page_004.pdf", "doc_page_005.pdf"]);
    assert_eq!(report.output_dir, out);
    assert!(out.join("doc_page_004.pdf").is_file());
}

#[test]
fn test_atomic_split_publishes_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 4);

    let options = SplitOptions::new().atomic(true);
    let report = PageSplitter::new(options).split(&source).unwrap();

    let mut on_disk: Vec<_> = fs::read_dir(&report.output_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, report.paths());
}

#[test]
fn test_atomic_failure_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 3);
    let output_dir = dir.path().join("separated_pages");
    fs::create_dir_all(output_dir.join("doc_page_003.pdf")).unwrap();

    let options = SplitOptions::new().atomic(true);
    let err = PageSplitter::new(options).split(&source).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Write);
    let leftovers: Vec<_> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, ["doc_page_003.pdf"]);
}

#[test]
fn test_unsorted_page_list_selects_every_listed_page() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_pdf(dir.path(), "doc.pdf", 6);

    let options = SplitOptions::new().with_pages(PageSelection::Pages(vec![5, 2]));
    let report = PageSplitter::new(options).split(&source).unwrap();

    let names: Vec<_> = report.artifacts.iter().map(|a| a.file_name.clone()).collect();
    assert_eq!(names, ["doc_page_002.pdf", "doc_page_005.pdf"]);
}

#[test]
fn test_nested_page_tree_attributes_reach_each_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_manual(dir.path(), "manual.pdf");

    let report = split_file(&source, None::<&str>).unwrap();
    assert_eq!(report.len(), 3);

    // Pages 1 and 2 sit under a section node that rotates them; page 3 does not.
    for (artifact, rotated) in report.artifacts.iter().zip([true, true, false]) {
        let doc = Document::load(&artifact.path).unwrap();
        let page = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
        assert!(page.has(b"Resources"), "{}", artifact.file_name);
        assert!(page.has(b"MediaBox"), "{}", artifact.file_name);
        let rotate = page.get(b"Rotate").and_then(|r| r.as_i64()).ok();
        assert_eq!(rotate, rotated.then_some(90), "{}", artifact.file_name);
    }
}

#[test]
fn test_cross_page_links_do_not_pull_in_other_pages() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_manual(dir.path(), "manual.pdf");

    let report = split_file(&source, None::<&str>).unwrap();

    let contents_page = &report.artifacts[2];
    let doc = Document::load(&contents_page.path).unwrap();
    let streams = doc
        .objects
        .values()
        .filter(|object| matches!(object, lopdf::Object::Stream(_)))
        .count();
    assert_eq!(streams, 1);
    let text = String::from_utf8_lossy(&common::only_page_content(&contents_page.path)).into_owned();
    assert!(text.contains("Page 3"));

    let page = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
    let annots = page.get(b"Annots").unwrap().as_array().unwrap();
    assert_eq!(annots.len(), 1);

    let catalog = doc.catalog().unwrap();
    assert!(!catalog.has(b"Outlines"));
}
