//! Page geometry for placing the page-number header
//!
//! All values are PDF points (1/72 inch) in default user space, origin at the
//! bottom-left corner of the page box.

use lopdf::Object;

/// A page rectangle such as a MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBox {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self { x0: 0.0, y0: 0.0, x1: 612.0, y1: 792.0 }
    }

    /// Build a normalized box from a PDF rectangle array `[llx lly urx ury]`
    ///
    /// Corners may be given in any order; the result always has `x0 <= x1`
    /// and `y0 <= y1`.
    pub fn from_object(object: &Object) -> Option<Self> {
        let values: Vec<f32> = object
            .as_array()
            .ok()?
            .iter()
            .filter_map(|v| v.as_float().ok())
            .collect();

        if values.len() != 4 {
            return None;
        }

        Some(Self {
            x0: values[0].min(values[2]),
            y0: values[1].min(values[3]),
            x1: values[0].max(values[2]),
            y1: values[1].max(values[3]),
        })
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// The box as a PDF rectangle array
    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.x0),
            Object::Real(self.y0),
            Object::Real(self.x1),
            Object::Real(self.y1),
        ])
    }
}

/// Where the page-number header sits relative to the top-right corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderPlacement {
    /// Font size in points
    pub font_size: f32,
    /// Distance from the top edge down to the text baseline
    pub top_offset: f32,
    /// Distance from the right edge to the right end of the text
    pub right_margin: f32,
}

impl Default for HeaderPlacement {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            top_offset: 35.0,
            right_margin: 20.0,
        }
    }
}

impl HeaderPlacement {
    /// Right edge x and baseline y of the header on `page`
    pub fn anchor(&self, page: &PageBox) -> (f32, f32) {
        (page.x1 - self.right_margin, page.y1 - self.top_offset)
    }
}
