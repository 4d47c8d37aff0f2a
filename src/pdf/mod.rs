//! PDF manipulation module

pub mod font;
pub mod merge;
pub mod metadata;
pub mod numbering;
pub mod overlay;
pub mod page;

// Re-export commonly used items
pub use font::{FontPreference, HeaderFont};
pub use merge::{merge_documents, merge_pdfs, MergeOptions};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use numbering::{add_page_numbers, number_document, NumberingOptions};
pub use overlay::{create_page_number_overlay, page_number_text, PageOverlay};
