//! Page-tree helpers shared by merging and numbering

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Page attributes a page may inherit from its ancestor `Pages` nodes
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against malformed trees whose Parent links form a cycle
const MAX_TREE_DEPTH: usize = 64;

/// Follow a reference to its target object, or return the object itself
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up `key` on a page, walking up the Parent chain when the page lacks it
///
/// The value is returned as stored, so it may still be a reference.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id)?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => node_id = *parent_id,
            _ => return Ok(None),
        }
    }

    Err(Error::General(format!(
        "Page tree deeper than {} levels at object {:?}",
        MAX_TREE_DEPTH, page_id
    )))
}

/// Copy inherited attributes onto the page itself
///
/// Needed before a page is moved under a different `Pages` node, which would
/// otherwise silently change its size or resources.
pub fn materialize_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut missing = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key)? {
                    missing.push((key, value));
                }
            }
        }
    }

    if missing.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in missing {
        debug!("Copying inherited {} onto page {:?}", String::from_utf8_lossy(key), page_id);
        page.set(key.to_vec(), value);
    }

    Ok(())
}

/// The page's effective MediaBox, falling back to US Letter when absent or malformed
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let page_box = match inherited_attribute(doc, page_id, b"MediaBox")? {
        Some(object) => PageBox::from_object(resolve(doc, &object)?),
        None => None,
    };

    Ok(page_box.unwrap_or_else(|| {
        debug!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
        PageBox::letter()
    }))
}

/// The page's effective Resources dictionary as an owned copy
///
/// Indirect and inherited dictionaries are resolved; a page without resources
/// gets an empty dictionary.
pub fn resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Some(object) => match resolve(doc, &object)? {
            Object::Dictionary(dict) => Ok(dict.clone()),
            _ => Ok(Dictionary::new()),
        },
        None => Ok(Dictionary::new()),
    }
}

/// References to the page's content streams, in drawing order
pub fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    let refs = match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            // An indirect array of streams
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Object::Array(items) => items.clone(),
        _ => Vec::new(),
    };

    Ok(refs)
}

/// Replace the page's Contents with the given stream references
pub fn set_content_refs(doc: &mut Document, page_id: ObjectId, refs: Vec<Object>) -> Result<()> {
    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(refs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Two-level tree: root Pages (with MediaBox + Resources) -> Page
    fn nested_document() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let root_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m".to_vec()));
        doc.objects.insert(
            page_id,
            dictionary! {
                "Type" => "Page",
                "Parent" => root_id,
                "Contents" => content_id,
            }
            .into(),
        );
        doc.objects.insert(
            root_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Resources" => dictionary! { "ProcSet" => vec!["PDF".into()] },
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => root_id });
        doc.trailer.set("Root", catalog_id);

        (doc, page_id)
    }

    #[test]
    fn test_media_box_is_inherited() {
        let (doc, page_id) = nested_document();
        let page_box = media_box(&doc, page_id).unwrap();
        assert_eq!(page_box.width(), 595.0);
        assert_eq!(page_box.height(), 842.0);
    }

    #[test]
    fn test_materialize_copies_missing_keys_only() {
        let (mut doc, page_id) = nested_document();
        materialize_inherited_attributes(&mut doc, page_id).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert!(!page.has(b"Rotate"));
        assert!(!page.has(b"CropBox"));
    }

    #[test]
    fn test_content_refs_wraps_single_reference() {
        let (doc, page_id) = nested_document();
        let refs = content_refs(&doc, page_id).unwrap();
        assert_eq!(refs.len(), 1);
        assert!(matches!(refs[0], Object::Reference(_)));
    }

    #[test]
    fn test_resources_resolves_inherited_dictionary() {
        let (doc, page_id) = nested_document();
        let dict = resources(&doc, page_id).unwrap();
        assert!(dict.has(b"ProcSet"));
    }
}
