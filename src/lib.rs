//! PDF Numerate Library
//!
//! Merges PDF and Word documents into a single PDF and stamps
//! "Pag. n/total" headers onto pages. This library provides functionality to:
//! - Add page-number headers to a PDF
//! - Merge multiple PDF files
//! - Convert DOCX files to PDF through LibreOffice or Microsoft Word
//! - Run the convert → merge → number pipeline
//! - Number every PDF in a folder
//!
//! # Example
//!
//! ```no_run
//! use pdf_numerate::pipeline::{build_merged_pdf, PipelineOptions};
//! use std::path::{Path, PathBuf};
//!
//! let options = PipelineOptions { enumerate: true, ..Default::default() };
//! build_merged_pdf(
//!     &[PathBuf::from("1. cover.docx"), PathBuf::from("2. annex.pdf")],
//!     Path::new("bundle.pdf"),
//!     &options,
//! ).expect("Failed to build bundle");
//! ```

pub mod batch;
pub mod convert;
pub mod error;
pub mod layout;
pub mod naming;
pub mod pdf;
pub mod pipeline;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use error::{Error, Result};
