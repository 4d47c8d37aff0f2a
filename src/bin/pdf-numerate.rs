//! PDF Numerate CLI tool
//!
//! A command-line tool for merging PDF/DOCX files and adding page-number headers.

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use pdf_numerate::batch::number_folder;
use pdf_numerate::convert::{platform_default_order, ConverterKind, ConverterSettings};
use pdf_numerate::naming::{normalize_output_path, numbered_output_path, DEFAULT_MERGED_NAME};
use pdf_numerate::pdf::{add_page_numbers, extract_metadata, FontPreference, NumberingOptions};
use pdf_numerate::pipeline::{build_merged_pdf, PipelineOptions};

/// PDF Numerate - Merge PDF & Word documents and add "Pag. n/total" headers
#[derive(Parser)]
#[command(name = "pdf-numerate")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge a Word cover letter and two PDFs, numbering the result
    pdf-numerate merge -e -o bundle.pdf cover.docx annex1.pdf annex2.pdf

    # Number a single PDF (writes contract_iloveVerum.pdf)
    pdf-numerate number contract.pdf

    # Number every PDF in a folder (writes <name>_numbered.pdf)
    pdf-numerate batch ./scans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "PDF_NUMERATE_VERBOSE")]
    verbose: bool,

    /// Header font: "auto" (Arial if installed, else Helvetica), "helvetica", or a .ttf path
    #[arg(long, global = true, env = "PDF_NUMERATE_FONT", default_value = "auto")]
    font: FontPreference,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDF and DOCX files into one PDF, in the given order
    Merge {
        /// Input .pdf/.docx files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long, default_value = DEFAULT_MERGED_NAME)]
        output: PathBuf,

        /// Add "Pag. n/total" to each page of the result
        #[arg(short, long)]
        enumerate: bool,

        /// DOCX converters to try, in order (libreoffice, word)
        #[arg(long, env = "PDF_NUMERATE_CONVERTERS", value_delimiter = ',')]
        converters: Vec<ConverterKind>,

        /// LibreOffice binary to use instead of searching PATH
        #[arg(long, env = "PDF_NUMERATE_SOFFICE")]
        soffice: Option<PathBuf>,

        /// Seconds to wait for each DOCX conversion
        #[arg(long, env = "PDF_NUMERATE_TIMEOUT", default_value_t = 300)]
        timeout: u64,

        /// Keep intermediate files in this directory instead of a temporary one
        #[arg(long)]
        scratch_dir: Option<PathBuf>,
    },

    /// Add "Pag. n/total" to every page of a PDF
    Number {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path (default: <input>_iloveVerum.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Number every PDF in a folder, writing <name>_numbered.pdf next to each
    Batch {
        /// Folder to process (default: current directory)
        folder: Option<PathBuf>,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let numbering = NumberingOptions {
        font: cli.font,
        ..Default::default()
    };

    let result = match cli.command {
        Commands::Merge {
            inputs, output, enumerate, converters, soffice, timeout, scratch_dir,
        } => {
            let converters = ConverterSettings {
                order: if converters.is_empty() { platform_default_order() } else { converters },
                timeout: Duration::from_secs(timeout),
                soffice,
                search_path: None,
            };
            cmd_merge(inputs, output, PipelineOptions {
                enumerate,
                scratch_dir,
                converters,
                numbering,
            })
        }
        Commands::Number { input, output } => cmd_number(input, output, &numbering),
        Commands::Batch { folder } => cmd_batch(folder, &numbering),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; the patterns themselves keep their
/// command-line order, which is the merge order.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => tracing::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Convert, merge and optionally number
fn cmd_merge(inputs: Vec<String>, output: PathBuf, options: PipelineOptions) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    let output = normalize_output_path(&output);

    tracing::info!("Merging {} files...", inputs.len());
    let created = build_merged_pdf(&inputs, &output, &options)?;

    println!("Created: {}", created.display());
    Ok(())
}

/// Number a single PDF
fn cmd_number(input: PathBuf, output: Option<PathBuf>, options: &NumberingOptions) -> Result<()> {
    let output = match output {
        Some(path) => normalize_output_path(&path),
        None => numbered_output_path(&input),
    };

    add_page_numbers(&input, &output, options)?;

    println!("Created: {}", output.display());
    Ok(())
}

/// Number every PDF in a folder
fn cmd_batch(folder: Option<PathBuf>, options: &NumberingOptions) -> Result<()> {
    let folder = match folder {
        Some(folder) => folder,
        None => {
            let cwd = std::env::current_dir().context("Cannot read current directory")?;
            println!("No folder given; using current directory: {}", cwd.display());
            cwd
        }
    };

    let report = number_folder(&folder, options)?;
    for created in &report.created {
        println!("Created: {}", created.display());
    }
    if !report.skipped.is_empty() {
        tracing::info!("Skipped {} already numbered files", report.skipped.len());
    }
    for empty in &report.empty {
        println!("Skipped (no pages): {}", empty.display());
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
