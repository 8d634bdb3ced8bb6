//! Source document loaded with lopdf.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::detect::{detect_format_from_bytes, PdfFormat};
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

/// A multi-page PDF opened for splitting.
///
/// The document is immutable once loaded. Pages are addressed by their
/// 0-based index in page-tree order.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    doc: LopdfDocument,
    format: PdfFormat,
    page_ids: Vec<ObjectId>,
    /// Every page and intermediate page-tree node.
    tree_nodes: BTreeSet<ObjectId>,
    path: Option<PathBuf>,
}

impl SourceDocument {
    /// Open a PDF file.
    ///
    /// A missing file is reported as [`Error::NotFound`]; anything that is
    /// not a parseable, unencrypted PDF is a parse-class error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_readable_file(path)?;

        let data = fs::read(path).map_err(|e| Error::read(path, e))?;
        let mut source = Self::from_bytes(&data)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let tree_nodes = page_tree_nodes(&doc, &page_ids);
        Ok(Self {
            doc,
            format,
            page_ids,
            tree_nodes,
            path: None,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Whether the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.page_ids.is_empty()
    }

    /// Header version (e.g. "1.7").
    pub fn version(&self) -> &str {
        &self.format.version
    }

    /// Path the document was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Decompressed content stream of the page at `index`.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>> {
        let page_id = self.page_id(index)?;
        Ok(self.doc.get_page_content(page_id)?)
    }

    /// Build a standalone document holding only the page at `index`.
    ///
    /// Only objects reachable from the page are copied. Inheritable
    /// attributes are pushed down onto the page, link annotations that jump
    /// to other pages are dropped, and any remaining reference into the rest
    /// of the page tree becomes `null`. The copy gets a fresh catalog that
    /// references nothing but its one-page tree.
    pub fn extract_page(&self, index: usize) -> Result<LopdfDocument> {
        let page_id = self.page_id(index)?;

        let mut page = self.doc.get_dictionary(page_id)?.clone();
        for (key, value) in inherited_attributes(&self.doc, page_id)? {
            page.set(key, value);
        }
        page.remove(b"Parent");

        if let Ok(annots) = page.get(b"Annots") {
            let kept = self.local_annotations(annots, page_id);
            if kept.is_empty() {
                page.remove(b"Annots");
            } else {
                page.set("Annots", kept);
            }
        }

        let single = PageCopier::new(self, page_id).finish(&page);
        log::debug!(
            "page {}: copied {} objects",
            index + 1,
            single.objects.len()
        );
        Ok(single)
    }

    /// Collect header and Info-dictionary details.
    pub fn info(&self) -> DocumentInfo {
        let mut info = DocumentInfo {
            pdf_version: self.format.version.clone(),
            page_count: self.page_count(),
            encrypted: self.doc.is_encrypted(),
            ..Default::default()
        };

        let dict = self
            .doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| self.doc.get_dictionary(id));

        if let Ok(dict) = dict {
            info.title = info_string(dict, b"Title");
            info.author = info_string(dict, b"Author");
            info.subject = info_string(dict, b"Subject");
            info.creator = info_string(dict, b"Creator");
            info.producer = info_string(dict, b"Producer");
        }

        info
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index as u32 + 1, self.page_count()))
    }

    /// Annotations of `page_id` that do not jump to another page.
    fn local_annotations(&self, annots: &Object, page_id: ObjectId) -> Vec<Object> {
        let Ok(list) = resolve(&self.doc, annots).and_then(Object::as_array) else {
            return Vec::new();
        };

        list.iter()
            .filter(|annot| {
                resolve(&self.doc, annot)
                    .and_then(Object::as_dict)
                    .map(|dict| !self.links_elsewhere(dict, page_id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Whether an annotation's `/Dest` or GoTo action targets another page.
    fn links_elsewhere(&self, annot: &Dictionary, page_id: ObjectId) -> bool {
        let target = |dest: &Object| -> Option<ObjectId> {
            let array = resolve(&self.doc, dest).and_then(Object::as_array).ok()?;
            array.first()?.as_reference().ok()
        };

        let dest = annot.get(b"Dest").ok().and_then(&target);
        let action = annot
            .get(b"A")
            .ok()
            .and_then(|a| resolve(&self.doc, a).and_then(Object::as_dict).ok())
            .and_then(|a| a.get(b"D").ok())
            .and_then(&target);

        [dest, action]
            .into_iter()
            .flatten()
            .any(|id| id != page_id && self.tree_nodes.contains(&id))
    }
}

/// Copies one page and everything it reaches into a fresh document.
///
/// Object ids are assigned in discovery order, so the same page always
/// produces the same output.
struct PageCopier<'a> {
    source: &'a SourceDocument,
    target: LopdfDocument,
    ids: BTreeMap<ObjectId, ObjectId>,
    pending: Vec<(ObjectId, ObjectId)>,
    page_id: ObjectId,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a SourceDocument, page_id: ObjectId) -> Self {
        let mut target = LopdfDocument::with_version(source.format.version.clone());
        let new_page_id = target.new_object_id();
        let mut ids = BTreeMap::new();
        ids.insert(page_id, new_page_id);

        Self {
            source,
            target,
            ids,
            pending: Vec::new(),
            page_id,
        }
    }

    fn finish(mut self, page: &Dictionary) -> LopdfDocument {
        let new_page_id = self.target_id(self.page_id);
        let mut page = self.map_dict(page);
        let pages_id = self.target.new_object_id();
        page.set("Parent", pages_id);

        let source = self.source;
        let info = source
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .map(|info| self.map(info));

        while let Some((old, new)) = self.pending.pop() {
            let object = match source.doc.get_object(old) {
                Ok(object) => self.map(object),
                Err(_) => Object::Null,
            };
            self.target.objects.insert(new, object);
        }

        self.target.objects.insert(new_page_id, Object::Dictionary(page));
        self.target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(new_page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = self.target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.target.trailer.set("Root", catalog_id);
        if let Some(info @ Object::Reference(_)) = info {
            self.target.trailer.set("Info", info);
        }

        self.target
    }

    fn target_id(&self, old: ObjectId) -> ObjectId {
        self.ids.get(&old).copied().unwrap_or(old)
    }

    /// New id for `old`, or `None` when it belongs to the rest of the page tree.
    fn map_id(&mut self, old: ObjectId) -> Option<ObjectId> {
        if let Some(&new) = self.ids.get(&old) {
            return Some(new);
        }
        if self.source.tree_nodes.contains(&old) {
            return None;
        }
        let new = self.target.new_object_id();
        self.ids.insert(old, new);
        self.pending.push((old, new));
        Some(new)
    }

    fn map(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.map_id(*id).map_or(Object::Null, Object::Reference),
            Object::Array(items) => Object::Array(items.iter().map(|item| self.map(item)).collect()),
            Object::Dictionary(dict) => Object::Dictionary(self.map_dict(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.map_dict(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn map_dict(&mut self, dict: &Dictionary) -> Dictionary {
        let mut mapped = Dictionary::new();
        for (key, value) in dict.iter() {
            mapped.set(key.clone(), self.map(value));
        }
        mapped
    }
}

/// Summary of a PDF file, as shown by `pagesplit info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,

    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

/// Check `path` names an existing regular file.
fn ensure_readable_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(Error::read(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is a directory"),
        )),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(path.to_path_buf())),
        Err(e) => Err(Error::read(path, e)),
    }
}

/// Pages plus every ancestor reachable through `/Parent`.
fn page_tree_nodes(doc: &LopdfDocument, page_ids: &[ObjectId]) -> BTreeSet<ObjectId> {
    let mut nodes = BTreeSet::new();
    for &page_id in page_ids {
        let mut current = Some(page_id);
        let mut depth = 0;
        while let Some(id) = current {
            if !nodes.insert(id) || depth >= MAX_TREE_DEPTH {
                break;
            }
            current = doc
                .get_dictionary(id)
                .and_then(|node| node.get(b"Parent"))
                .and_then(Object::as_reference)
                .ok();
            depth += 1;
        }
    }
    nodes
}

/// Follow `object` if it is a reference.
fn resolve<'a>(doc: &'a LopdfDocument, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Walk the `/Parent` chain and pick up inheritable keys the page lacks.
fn inherited_attributes(
    doc: &LopdfDocument,
    page_id: ObjectId,
) -> Result<Vec<(&'static [u8], Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&'static [u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(node_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(found)
}

fn info_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Decode a text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
