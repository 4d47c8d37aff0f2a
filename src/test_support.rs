//! In-memory PDF builders and inspectors for unit tests

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::pdf::page;

/// A Letter-sized document with one page per label; each page draws its label
pub fn sample_document(labels: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for label in labels {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", label);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Count" => labels.len() as i64,
            "Kids" => kids,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// The `Pag. n/total` text drawn by each page's overlay, in page order
pub fn header_texts(doc: &Document) -> Vec<Option<String>> {
    doc.get_pages()
        .values()
        .map(|page_id| header_text(doc, *page_id))
        .collect()
}

fn header_text(doc: &Document, page_id: ObjectId) -> Option<String> {
    let resources = page::resources(doc, page_id).ok()?;
    let xobjects = page::resolve(doc, resources.get(b"XObject").ok()?).ok()?.as_dict().ok()?;

    xobjects.iter().find_map(|(_, object)| {
        let stream = page::resolve(doc, object).ok()?.as_stream().ok()?;
        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = String::from_utf8_lossy(&bytes);
        let start = content.find("(Pag. ")? + 1;
        let end = start + content[start..].find(')')?;
        Some(content[start..end].to_string())
    })
}
