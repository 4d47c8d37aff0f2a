//! Fixture PDFs generated on the fly for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Write a Letter-sized PDF with one page per label; each page draws its label
pub fn write_pdf(dir: &Path, name: &str, labels: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_document(labels, false);
    doc.save(&path).expect("Failed to write fixture PDF");
    path
}

/// Like [`write_pdf`], but the MediaBox (A4) and Resources live on the Pages node
pub fn write_pdf_with_inherited_attributes(dir: &Path, name: &str, labels: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_document(labels, true);
    doc.save(&path).expect("Failed to write fixture PDF");
    path
}

fn build_document(labels: &[&str], inherited: bool) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };

    let mut kids = Vec::new();
    for label in labels {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", label);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !inherited {
            page.set("MediaBox", vec![0.into(), 0.into(), 612.into(), 792.into()]);
            page.set("Resources", resources.clone());
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => labels.len() as i64,
        "Kids" => kids,
    };
    if inherited {
        pages.set("MediaBox", vec![0.into(), 0.into(), 595.into(), 842.into()]);
        pages.set("Resources", resources);
    }
    doc.objects.insert(pages_id, pages.into());

    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Decompressed content of a stream object
fn stream_text(doc: &Document, object: &Object) -> Option<String> {
    let stream = match object {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_stream().ok()?,
        Object::Stream(stream) => stream,
        _ => return None,
    };
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn first_parenthesized(text: &str, prefix: &str) -> Option<String> {
    let start = text.find(prefix)? + 1;
    let end = start + text[start..].find(')')?;
    Some(text[start..end].to_string())
}

/// Label drawn by each page's own content, in page order
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|id| {
            let content = String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned();
            first_parenthesized(&content, "(").unwrap_or_default()
        })
        .collect()
}

/// `Pag. n/total` text of each page's overlay, `None` for unnumbered pages
pub fn header_texts(doc: &Document) -> Vec<Option<String>> {
    doc.get_pages()
        .values()
        .map(|id| header_text(doc, *id))
        .collect()
}

fn header_text(doc: &Document, page_id: ObjectId) -> Option<String> {
    let page = doc.get_dictionary(page_id).ok()?;
    let resources = match page.get(b"Resources").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let xobjects = match resources.get(b"XObject").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    xobjects
        .iter()
        .filter_map(|(_, object)| stream_text(doc, object))
        .find_map(|text| first_parenthesized(&text, "(Pag. "))
}

/// Overlay XObject BBox of the first page, as `[x0, y0, x1, y1]`
pub fn first_overlay_bbox(doc: &Document) -> Option<Vec<f32>> {
    let page_id = *doc.get_pages().values().next()?;
    let page = doc.get_dictionary(page_id).ok()?;
    let resources = page.get(b"Resources").ok()?.as_dict().ok()?;
    let xobjects = resources.get(b"XObject").ok()?.as_dict().ok()?;
    let id = xobjects.get(b"PageNumber").ok()?.as_reference().ok()?;
    let stream = doc.get_object(id).ok()?.as_stream().ok()?;
    let bbox = stream.dict.get(b"BBox").ok()?.as_array().ok()?;
    Some(bbox.iter().filter_map(|v| v.as_float().ok()).collect())
}
