//! Error types for the pdf-numerate library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Remediation shown when no DOCX converter could produce a PDF
pub const CONVERTER_INSTALL_HINT: &str = "To convert Word (.docx) files, install one of:
  - LibreOffice: https://www.libreoffice.org (macOS: brew install --cask libreoffice)
  - docx2pdf: pip install docx2pdf (uses Microsoft Word on Windows/macOS)
Merging PDF-only files does not require either.";

/// Main error type for the pdf-numerate library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input is neither a PDF nor a DOCX
    #[error("Unsupported format: {} (use .pdf or .docx)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Converter was handed something other than a .docx
    #[error("Not a .docx file: {}", .0.display())]
    NotDocx(PathBuf),

    /// Batch mode target is not a folder
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Nothing to merge
    #[error("No PDF or DOCX files to merge.")]
    NoInputs,

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Every configured DOCX converter failed
    #[error(
        "Could not convert {} to PDF:\n{}\n{}",
        .input.display(),
        .attempts.join("\n"),
        CONVERTER_INSTALL_HINT
    )]
    ConversionFailed {
        input: PathBuf,
        /// One line per attempted converter, with the reason it failed
        attempts: Vec<String>,
    },

    /// Font error
    #[error("Font error: {0}")]
    Font(String),

    /// General error
    #[error("{0}")]
    General(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_failure_names_both_install_options() {
        let err = Error::ConversionFailed {
            input: PathBuf::from("letter.docx"),
            attempts: vec![
                "libreoffice: not installed".to_string(),
                "word: not installed".to_string(),
            ],
        };
        let message = err.to_string();

        assert!(message.contains("letter.docx"));
        assert!(message.contains("libreoffice: not installed"));
        assert!(message.contains("LibreOffice"));
        assert!(message.contains("docx2pdf"));
    }

    #[test]
    fn unsupported_format_mentions_accepted_extensions() {
        let err = Error::UnsupportedFormat(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "Unsupported format: notes.txt (use .pdf or .docx)");
    }
}
