//! Synthetic PDFs shared by unit tests, integration tests and benchmarks.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// A PDF with `page_count` pages, each showing "Page N".
///
/// MediaBox and Resources live on the root page tree node so pages have to
/// inherit them.
pub fn pdf_with_pages(page_count: usize) -> Result<Vec<u8>> {
    save(flat(page_count, None)?)
}

/// Like [`pdf_with_pages`] with an Info dictionary carrying `title`.
pub fn pdf_with_title(page_count: usize, title: &str) -> Result<Vec<u8>> {
    save(flat(page_count, Some(title))?)
}

/// A three-page manual with a nested page tree and cross-page links.
///
/// ```text
/// root (MediaBox, Resources)
/// ├── section (Rotate 90)
/// │   ├── page 1
/// │   └── page 2
/// └── page 3  (contents page: links to pages 1 and 2)
/// ```
///
/// Page 3 carries a `/Dest` link to page 1, a GoTo action to page 2 and a
/// text note pointing back at itself. The catalog has an outline whose only
/// entry targets page 1.
pub fn manual_with_links() -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.7");
    let root_id = doc.new_object_id();
    let section_id = doc.new_object_id();
    let resources_id = doc.add_object(font_resources());

    let page1 = add_page(&mut doc, section_id, 1)?;
    let page2 = add_page(&mut doc, section_id, 2)?;
    let page3 = add_page(&mut doc, root_id, 3)?;

    let to_page1 = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect(72, 600, 300, 620),
        "Dest" => vec![Object::Reference(page1), Object::Name(b"Fit".to_vec())],
    });
    let to_page2 = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect(72, 560, 300, 580),
        "A" => dictionary! {
            "S" => "GoTo",
            "D" => vec![
                Object::Reference(page2),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        },
    });
    let note = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => rect(10, 10, 30, 30),
        "Contents" => Object::string_literal("Start here"),
        "P" => page3,
    });
    if let Ok(page) = doc.get_object_mut(page3).and_then(Object::as_dict_mut) {
        page.set(
            "Annots",
            vec![
                Object::Reference(to_page1),
                Object::Reference(to_page2),
                Object::Reference(note),
            ],
        );
    }

    doc.objects.insert(
        section_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => vec![Object::Reference(page1), Object::Reference(page2)],
            "Count" => Object::Integer(2),
            "Rotate" => Object::Integer(90),
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(section_id), Object::Reference(page3)],
            "Count" => Object::Integer(3),
            "Resources" => resources_id,
            "MediaBox" => rect(0, 0, 595, 842),
        }),
    );

    let outlines_id = doc.new_object_id();
    let entry_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Installation"),
        "Parent" => outlines_id,
        "Dest" => vec![Object::Reference(page1), Object::Name(b"Fit".to_vec())],
    });
    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => entry_id,
            "Last" => entry_id,
            "Count" => Object::Integer(1),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
        "Outlines" => outlines_id,
    });
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

fn flat(page_count: usize, title: Option<&str>) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = doc.add_object(font_resources());

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for number in 1..=page_count {
        kids.push(add_page(&mut doc, pages_id, number)?.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count as i64),
            "Resources" => resources_id,
            "MediaBox" => rect(0, 0, 595, 842),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    Ok(doc)
}

/// Add a page showing "Page {number}" under `parent`.
fn add_page(doc: &mut Document, parent: ObjectId, number: usize) -> Result<ObjectId> {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Integer(24)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
            Operation::new(
                "Tj",
                vec![Object::string_literal(format!("Page {}", number))],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

fn font_resources() -> Dictionary {
    dictionary! {
        "Font" => dictionary! {
            "F1" => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
            },
        },
    }
}

fn rect(llx: i64, lly: i64, urx: i64, ury: i64) -> Vec<Object> {
    vec![
        Object::Integer(llx),
        Object::Integer(lly),
        Object::Integer(urx),
        Object::Integer(ury),
    ]
}

fn save(mut doc: Document) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    doc.save_to(&mut data)
        .map_err(|e| Error::Other(format!("fixture failed to save: {}", e)))?;
    Ok(data)
}
