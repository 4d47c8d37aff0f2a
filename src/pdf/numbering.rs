//! Stamping "Pag. n/total" headers onto every page of a PDF
//!
//! Each page gets its own overlay Form XObject. The page's original content is
//! wrapped in `q`/`Q` first so that any transformation it leaves behind cannot
//! displace the header, then an extra content stream paints the overlay on top.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::HeaderPlacement;
use crate::pdf::font::{FontPreference, HeaderFont};
use crate::pdf::overlay::create_page_number_overlay;
use crate::pdf::page;

/// Base name for the overlay entry in a page's XObject resources
const OVERLAY_XOBJECT_NAME: &str = "PageNumber";

/// Options for numbering pages
#[derive(Debug, Clone, Default)]
pub struct NumberingOptions {
    /// Header size and position
    pub placement: HeaderPlacement,
    /// Typeface for the header
    pub font: FontPreference,
}

/// Add `Pag. n/total` to every page of `input_path` and save to `output_path`
///
/// Returns the number of pages numbered.
///
/// # Example
///
/// ```no_run
/// use pdf_numerate::pdf::{add_page_numbers, NumberingOptions};
/// use std::path::Path;
///
/// add_page_numbers(
///     Path::new("report.pdf"),
///     Path::new("report_numbered.pdf"),
///     &NumberingOptions::default(),
/// ).expect("Failed to number pages");
/// ```
pub fn add_page_numbers(input_path: &Path, output_path: &Path, options: &NumberingOptions) -> Result<usize> {
    if !input_path.exists() {
        return Err(Error::FileNotFound(input_path.to_path_buf()));
    }

    let mut doc = Document::load(input_path)?;
    let page_count = number_document(&mut doc, options)?;
    if page_count == 0 {
        return Err(Error::EmptyPdf(input_path.to_path_buf()));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    doc.compress();
    doc.save(output_path)?;

    info!("Numbered {} pages: {}", page_count, output_path.display());
    Ok(page_count)
}

/// Number every page of an in-memory document, returning the page count
pub fn number_document(doc: &mut Document, options: &NumberingOptions) -> Result<usize> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let total = page_ids.len();
    if total == 0 {
        return Ok(0);
    }

    let font = HeaderFont::resolve(&options.font)?;
    debug!("Header font {} (embedded: {})", font.base_font(), font.is_embedded());
    let font_id = font.install(doc);

    for (index, page_id) in page_ids.iter().copied().enumerate() {
        let page_box = page::media_box(doc, page_id)?;
        let overlay = create_page_number_overlay(&page_box, index + 1, total, &font, &options.placement)?;
        debug!("Page {}: \"{}\" at ({:.1}, {:.1})", index + 1, overlay.text, overlay.x, overlay.baseline);

        let xobject_id = doc.add_object(overlay.into_xobject(font_id));

        isolate_page_content(doc, page_id)?;
        let name = add_xobject_to_page_resources(doc, page_id, xobject_id)?;

        let invoke = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let invoke_id = doc.add_object(Stream::new(Dictionary::new(), invoke.encode()?));
        append_content_to_page(doc, page_id, invoke_id)?;
    }

    Ok(total)
}

/// Wrap the page's existing content streams in a `q`/`Q` pair
///
/// Content that ends with a modified CTM (a bare `cm` is common in generated
/// PDFs) would otherwise move anything drawn after it.
fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut refs = page::content_refs(doc, page_id)?;
    if refs.is_empty() {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    refs.insert(0, Object::Reference(save_id));
    refs.push(Object::Reference(restore_id));
    page::set_content_refs(doc, page_id, refs)
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn after the original, so the header sits on top of
/// any background fills.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut refs = page::content_refs(doc, page_id)?;
    refs.push(Object::Reference(new_content_id));
    page::set_content_refs(doc, page_id, refs)
}

/// Register the overlay in the page's XObject resources, returning the name used
///
/// Shared or inherited resource dictionaries are copied onto the page so the
/// change stays local to it.
fn add_xobject_to_page_resources(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
    let mut resources = page::resources(doc, page_id)?;

    let mut xobjects = match resources.get(b"XObject") {
        Ok(object) => match page::resolve(doc, object)? {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };

    let name = unused_name(&xobjects, OVERLAY_XOBJECT_NAME);
    xobjects.set(name.as_str(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let page_dict = doc.get_dictionary_mut(page_id)?;
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// `base`, or `base` with the smallest numeric suffix not yet in `dict`
fn unused_name(dict: &Dictionary, base: &str) -> String {
    if !dict.has(base.as_bytes()) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !dict.has(candidate.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{header_texts, sample_document};

    fn helvetica() -> NumberingOptions {
        NumberingOptions {
            font: FontPreference::Helvetica,
            ..Default::default()
        }
    }

    #[test]
    fn test_every_page_gets_its_number() {
        let mut doc = sample_document(&["one", "two", "three"]);
        let total = number_document(&mut doc, &helvetica()).unwrap();

        assert_eq!(total, 3);
        assert_eq!(
            header_texts(&doc),
            vec![
                Some("Pag. 1/3".to_string()),
                Some("Pag. 2/3".to_string()),
                Some("Pag. 3/3".to_string()),
            ]
        );
    }

    #[test]
    fn test_original_content_is_wrapped() {
        let mut doc = sample_document(&["only"]);
        number_document(&mut doc, &helvetica()).unwrap();

        let page_id = *doc.get_pages().values().next().unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();

        let save = content.find("q\n").unwrap();
        let label = content.find("(only)").unwrap();
        let invoke = content.find("/PageNumber Do").unwrap();
        assert!(save < label);
        assert!(label < invoke);
    }

    #[test]
    fn test_existing_xobject_name_is_not_clobbered() {
        let mut xobjects = Dictionary::new();
        xobjects.set("PageNumber", Object::Null);
        xobjects.set("PageNumber1", Object::Null);

        assert_eq!(unused_name(&xobjects, "PageNumber"), "PageNumber2");
        assert_eq!(unused_name(&Dictionary::new(), "PageNumber"), "PageNumber");
    }

    #[test]
    fn test_original_fonts_survive() {
        let mut doc = sample_document(&["kept"]);
        number_document(&mut doc, &helvetica()).unwrap();

        let page_id = *doc.get_pages().values().next().unwrap();
        let resources = page::resources(&doc, page_id).unwrap();
        assert!(resources.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));
        assert!(resources.get(b"XObject").unwrap().as_dict().unwrap().has(b"PageNumber"));
    }

    #[test]
    fn test_empty_document_numbers_nothing() {
        let mut doc = sample_document(&[]);
        assert_eq!(number_document(&mut doc, &helvetica()).unwrap(), 0);
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let result = add_page_numbers(Path::new("missing.pdf"), Path::new("out.pdf"), &helvetica());
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
