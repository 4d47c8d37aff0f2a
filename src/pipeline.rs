//! Convert → merge → optionally number
//!
//! The pipeline takes an ordered list of PDF and DOCX files and produces one
//! PDF. Every input is validated before anything is converted or written.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::convert::{ConverterSettings, DocxConverter, ExternalConverter};
use crate::error::{Error, Result};
use crate::pdf::{add_page_numbers, merge_pdfs, MergeOptions, NumberingOptions};

/// Kind of input accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Docx,
}

impl InputKind {
    /// Classify by extension, case-insensitively
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(InputKind::Pdf),
            Some("docx") => Ok(InputKind::Docx),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Options for [`build_merged_pdf`]
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Stamp "Pag. n/total" on the merged result
    pub enumerate: bool,
    /// Directory for intermediate files; a private temporary one when `None`
    pub scratch_dir: Option<PathBuf>,
    /// External DOCX converter settings
    pub converters: ConverterSettings,
    /// Header settings used when `enumerate` is set
    pub numbering: NumberingOptions,
}

/// Where intermediate files go for one invocation
enum Scratch {
    /// Removed when dropped
    Owned(TempDir),
    /// Supplied by the caller and left in place
    Borrowed(PathBuf),
}

impl Scratch {
    fn new(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(Scratch::Borrowed(dir.to_path_buf()))
            }
            None => Ok(Scratch::Owned(tempfile::Builder::new().prefix("pdf-numerate-").tempdir()?)),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Scratch::Owned(dir) => dir.path(),
            Scratch::Borrowed(dir) => dir,
        }
    }
}

/// Convert any DOCX inputs, merge everything in order and optionally number the result
///
/// DOCX files are converted with the external tools configured in
/// `options.converters`. Returns the path of the written PDF.
///
/// # Example
///
/// ```no_run
/// use pdf_numerate::pipeline::{build_merged_pdf, PipelineOptions};
/// use std::path::{Path, PathBuf};
///
/// let options = PipelineOptions { enumerate: true, ..Default::default() };
/// build_merged_pdf(
///     &[PathBuf::from("cover.docx"), PathBuf::from("annex.pdf")],
///     Path::new("bundle.pdf"),
///     &options,
/// ).expect("Failed to build bundle");
/// ```
pub fn build_merged_pdf(inputs: &[PathBuf], output_path: &Path, options: &PipelineOptions) -> Result<PathBuf> {
    let converter = ExternalConverter::new(options.converters.clone());
    build_merged_pdf_with(inputs, output_path, options, &converter)
}

/// [`build_merged_pdf`] with a caller-supplied DOCX converter
pub fn build_merged_pdf_with(
    inputs: &[PathBuf],
    output_path: &Path,
    options: &PipelineOptions,
    converter: &dyn DocxConverter,
) -> Result<PathBuf> {
    let classified = classify_inputs(inputs)?;
    if classified.is_empty() {
        return Err(Error::NoInputs);
    }

    let scratch = Scratch::new(options.scratch_dir.as_deref())?;
    debug!("Scratch directory: {}", scratch.path().display());

    let mut pdf_paths = Vec::with_capacity(classified.len());
    for (index, (path, kind)) in classified.into_iter().enumerate() {
        match kind {
            InputKind::Pdf => pdf_paths.push(path),
            InputKind::Docx => {
                // One folder per input so equal stems from different folders cannot collide
                let out_dir = scratch.path().join(format!("docx-{:03}", index + 1));
                info!("Converting {}", path.display());
                pdf_paths.push(converter.convert(&path, &out_dir)?);
            }
        }
    }

    let merged_path = scratch.path().join("merged.pdf");
    merge_pdfs(&MergeOptions {
        input_paths: pdf_paths,
        output_path: merged_path.clone(),
    })?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if options.enumerate {
        add_page_numbers(&merged_path, output_path, &options.numbering)?;
    } else {
        std::fs::copy(&merged_path, output_path)?;
    }

    info!("Created {}", output_path.display());
    Ok(output_path.to_path_buf())
}

/// Check every input exists and has a supported extension, keeping order
fn classify_inputs(inputs: &[PathBuf]) -> Result<Vec<(PathBuf, InputKind)>> {
    inputs
        .iter()
        .map(|path| {
            if !path.exists() {
                return Err(Error::FileNotFound(path.clone()));
            }
            Ok((path.clone(), InputKind::from_path(path)?))
        })
        .collect()
}
