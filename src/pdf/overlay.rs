//! Page-number overlay generation
//!
//! An overlay is a single-page drawing, packaged as a Form XObject, holding the
//! `Pag. n/total` text right-aligned near the top-right corner of the page.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::error::Result;
use crate::layout::{HeaderPlacement, PageBox};
use crate::pdf::font::HeaderFont;

/// Resource name the overlay uses for its font
pub const OVERLAY_FONT_NAME: &str = "F1";

/// Header text for a page: `Pag. {current}/{total}`
pub fn page_number_text(current: usize, total: usize) -> String {
    format!("Pag. {}/{}", current, total)
}

/// Drawing of a page-number header for one page
#[derive(Debug, Clone)]
pub struct PageOverlay {
    /// Bounding box of the drawing, equal to the target page's box
    pub bbox: PageBox,
    /// The header text
    pub text: String,
    /// Left end of the text
    pub x: f32,
    /// Text baseline
    pub baseline: f32,
    /// Encoded content stream
    pub content: Vec<u8>,
}

impl PageOverlay {
    /// Package the drawing as a Form XObject whose font resource points at `font_id`
    pub fn into_xobject(self, font_id: ObjectId) -> Stream {
        let mut fonts = Dictionary::new();
        fonts.set(OVERLAY_FONT_NAME, Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Form".to_vec()));
        dict.set("FormType", Object::Integer(1));
        dict.set("BBox", self.bbox.to_object());
        dict.set("Resources", Object::Dictionary(resources));

        Stream::new(dict, self.content)
    }
}

/// Create the page-number drawing for page `current` of `total`
///
/// The text's right end sits `placement.right_margin` points left of the
/// page's right edge, and its baseline `placement.top_offset` points below
/// the top edge.
pub fn create_page_number_overlay(
    page: &PageBox,
    current: usize,
    total: usize,
    font: &HeaderFont,
    placement: &HeaderPlacement,
) -> Result<PageOverlay> {
    let text = page_number_text(current, total);
    let (right, baseline) = placement.anchor(page);
    let x = right - font.text_width(&text, placement.font_size);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Integer(0)]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(OVERLAY_FONT_NAME.as_bytes().to_vec()),
                    Object::Real(placement.font_size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
            Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };

    Ok(PageOverlay {
        bbox: *page,
        text,
        x,
        baseline,
        content: content.encode()?,
    })
}
