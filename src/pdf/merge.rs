//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pdf::page;

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Merge multiple PDF files into a single PDF
///
/// Pages appear in input order, each input contributing its pages in their
/// original order. Returns the total page count.
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use pdf_numerate::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("cover.pdf"),
///         PathBuf::from("body.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::NoInputs);
    }

    // Validate all input files exist before loading any of them
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut documents = Vec::with_capacity(options.input_paths.len());
    for path in &options.input_paths {
        let doc = Document::load(path)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.clone()));
        }
        debug!("Loaded {} ({} pages)", path.display(), doc.get_pages().len());
        documents.push(doc);
    }

    let mut merged = merge_documents(documents)?;
    let page_count = merged.get_pages().len();

    write_document(&mut merged, &options.output_path)?;

    info!(
        "Merged {} files into {} pages: {}",
        options.input_paths.len(),
        page_count,
        options.output_path.display()
    );
    Ok(page_count)
}

/// Concatenate the pages of `documents` into a new document
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    if documents.is_empty() {
        return Err(Error::NoInputs);
    }

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Pages are re-parented below, so anything they inherit must move onto them
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for page_id in &pages {
            page::materialize_inherited_attributes(&mut doc, *page_id)?;
        }

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages() again: renumbering changed the ids
        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);

    // new_object_id() must hand out ids above everything we just added
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        let page_dict = merged.get_dictionary_mut(page_id)?;
        page_dict.set("Parent", Object::Reference(pages_id));
    }

    // Drop the source catalogs, page trees and anything only they referenced
    merged.prune_objects();

    Ok(merged)
}

/// Compress and save, creating the parent directory if needed
fn write_document(doc: &mut Document, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    doc.compress();
    doc.save(output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_document;

    fn labels(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .values()
            .map(|id| {
                let content = String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned();
                let start = content.find('(').unwrap() + 1;
                let end = content.find(')').unwrap();
                content[start..end].to_string()
            })
            .collect()
    }

    #[test]
    fn test_merge_documents_concatenates_in_order() {
        let merged = merge_documents(vec![
            sample_document(&["a1"]),
            sample_document(&["b1", "b2"]),
            sample_document(&["c1", "c2", "c3"]),
        ])
        .unwrap();

        assert_eq!(labels(&merged), vec!["a1", "b1", "b2", "c1", "c2", "c3"]);
    }

    #[test]
    fn test_merge_documents_sets_single_parent() {
        let merged = merge_documents(vec![sample_document(&["a"]), sample_document(&["b"])]).unwrap();

        let parents: Vec<ObjectId> = merged
            .get_pages()
            .values()
            .map(|id| {
                merged
                    .get_dictionary(*id)
                    .unwrap()
                    .get(b"Parent")
                    .unwrap()
                    .as_reference()
                    .unwrap()
            })
            .collect();
        assert_eq!(parents[0], parents[1]);
    }

    #[test]
    fn test_merge_documents_rejects_empty_list() {
        assert!(matches!(merge_documents(Vec::new()), Err(Error::NoInputs)));
    }

    #[test]
    fn test_merge_options_creation() {
        let options = MergeOptions {
            input_paths: vec![PathBuf::from("test1.pdf"), PathBuf::from("test2.pdf")],
            output_path: PathBuf::from("merged.pdf"),
        };

        assert_eq!(options.input_paths.len(), 2);
        assert_eq!(options.output_path, Path::new("merged.pdf"));
    }
}
