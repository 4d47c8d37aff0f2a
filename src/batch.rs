//! Folder batch numbering
//!
//! Every `*.pdf` directly inside a folder gets a numbered copy next to it,
//! named `<stem>_numbered.pdf`. Files that are already batch outputs are
//! skipped, so running the batch twice never numbers a numbered file. A PDF
//! without pages is logged and left alone; the rest of the folder is still
//! processed.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::naming::{batch_output_path, is_batch_output};
use crate::pdf::{add_page_numbers, NumberingOptions};

/// What a batch run did
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Numbered files written, in processing order
    pub created: Vec<PathBuf>,
    /// Inputs left alone because they are batch outputs themselves
    pub skipped: Vec<PathBuf>,
    /// Inputs without any pages
    pub empty: Vec<PathBuf>,
}

/// Number every PDF in `folder` (non-recursive, sorted by name)
pub fn number_folder(folder: &Path, options: &NumberingOptions) -> Result<BatchReport> {
    if !folder.is_dir() {
        return Err(Error::NotADirectory(folder.to_path_buf()));
    }

    let mut report = BatchReport::default();
    for pdf_path in list_pdfs(folder)? {
        if is_batch_output(&pdf_path) {
            debug!("Skipping already numbered {}", pdf_path.display());
            report.skipped.push(pdf_path);
            continue;
        }

        let output_path = batch_output_path(&pdf_path);
        match add_page_numbers(&pdf_path, &output_path, options) {
            Ok(_) => {
                info!("Created: {}", output_path.display());
                report.created.push(output_path);
            }
            Err(Error::EmptyPdf(path)) => {
                warn!("Skipping {}: no pages", path.display());
                report.empty.push(path);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Regular files in `folder` matching `*.pdf`, sorted by path
fn list_pdfs(folder: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.pdf", Pattern::escape(&folder.to_string_lossy()));
    debug!("Scanning {}", pattern);

    let mut pdfs = Vec::new();
    let entries = glob::glob(&pattern)
        .map_err(|e| Error::General(format!("Invalid folder pattern {}: {}", pattern, e)))?;
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => pdfs.push(path),
            Ok(_) => {}
            Err(e) => warn!("Cannot read {}: {}", e.path().display(), e.error()),
        }
    }
    pdfs.sort();
    Ok(pdfs)
}
