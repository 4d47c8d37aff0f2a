//! DOCX to PDF conversion through external tools
//!
//! Two converters are supported: headless LibreOffice (`soffice`) and the
//! `docx2pdf` bridge, which drives Microsoft Word. They are tried in a
//! configurable order; the default prefers Word on Windows and LibreOffice
//! everywhere else.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Default limit for a single conversion subprocess
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How often a running converter is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// LibreOffice's binary inside the macOS app bundle
const MACOS_SOFFICE: &str = "/Applications/LibreOffice.app/Contents/MacOS/soffice";

/// An external DOCX converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterKind {
    /// Headless LibreOffice
    LibreOffice,
    /// Microsoft Word through `docx2pdf`
    Word,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterKind::LibreOffice => write!(f, "libreoffice"),
            ConverterKind::Word => write!(f, "word"),
        }
    }
}

impl FromStr for ConverterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "libreoffice" | "soffice" => Ok(ConverterKind::LibreOffice),
            "word" | "docx2pdf" => Ok(ConverterKind::Word),
            other => Err(format!(
                "unknown converter '{}' (expected 'libreoffice' or 'word')",
                other
            )),
        }
    }
}

/// The converter order used when none is configured
pub fn platform_default_order() -> Vec<ConverterKind> {
    if cfg!(windows) {
        vec![ConverterKind::Word, ConverterKind::LibreOffice]
    } else {
        vec![ConverterKind::LibreOffice, ConverterKind::Word]
    }
}

/// Settings for the external converters
#[derive(Debug, Clone)]
pub struct ConverterSettings {
    /// Converters to try, first to last
    pub order: Vec<ConverterKind>,
    /// Limit for each conversion subprocess
    pub timeout: Duration,
    /// Explicit LibreOffice binary, tried before searching PATH
    pub soffice: Option<PathBuf>,
    /// Directories searched for converter binaries; `PATH` when `None`
    pub search_path: Option<Vec<PathBuf>>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            order: platform_default_order(),
            timeout: DEFAULT_TIMEOUT,
            soffice: None,
            search_path: None,
        }
    }
}

/// Something that turns a `.docx` into a PDF
pub trait DocxConverter {
    /// Convert `input` into a PDF inside `output_dir`, returning the PDF's path
    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf>;
}

/// Converter backed by the external tools in [`ConverterSettings::order`]
#[derive(Debug, Clone, Default)]
pub struct ExternalConverter {
    settings: ConverterSettings,
}

impl ExternalConverter {
    pub fn new(settings: ConverterSettings) -> Self {
        Self { settings }
    }

    fn attempt(&self, kind: ConverterKind, input: &Path, output_dir: &Path, expected: &Path) -> Result<()> {
        let mut command = match kind {
            ConverterKind::LibreOffice => {
                let soffice = self.find_soffice().ok_or_else(|| {
                    Error::General("LibreOffice (soffice) not found".to_string())
                })?;
                let mut command = Command::new(soffice);
                command
                    .arg("--headless")
                    .arg("--convert-to")
                    .arg("pdf")
                    .arg("--outdir")
                    .arg(output_dir)
                    .arg(input);
                command
            }
            ConverterKind::Word => {
                let docx2pdf = self
                    .find_executable("docx2pdf")
                    .ok_or_else(|| Error::General("docx2pdf not found".to_string()))?;
                let mut command = Command::new(docx2pdf);
                command.arg(input).arg(expected);
                command
            }
        };

        debug!("Running {:?}", command);
        run_with_timeout(&mut command, self.settings.timeout)
    }

    fn find_soffice(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.settings.soffice {
            if explicit.exists() {
                return Some(explicit.clone());
            }
            warn!("Configured LibreOffice binary not found: {}", explicit.display());
        }

        self.find_executable("soffice")
            .or_else(|| self.find_executable("libreoffice"))
            .or_else(|| {
                let bundled = PathBuf::from(MACOS_SOFFICE);
                bundled.exists().then_some(bundled)
            })
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        match &self.settings.search_path {
            Some(dirs) => find_executable_in(name, dirs.iter().cloned()),
            None => {
                let path_var = std::env::var_os("PATH")?;
                find_executable_in(name, std::env::split_paths(&path_var))
            }
        }
    }
}

impl DocxConverter for ExternalConverter {
    fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let expected = validate_docx(input, output_dir)?;
        std::fs::create_dir_all(output_dir)?;

        let mut attempts = Vec::new();
        for kind in &self.settings.order {
            match self.attempt(*kind, input, output_dir, &expected) {
                Ok(()) if expected.exists() => {
                    info!("Converted {} with {}", input.display(), kind);
                    return Ok(expected);
                }
                Ok(()) => {
                    let reason = format!("{}: finished without producing {}", kind, expected.display());
                    warn!("{}", reason);
                    attempts.push(reason);
                }
                Err(e) => {
                    warn!("{} could not convert {}: {}", kind, input.display(), e);
                    attempts.push(format!("{}: {}", kind, e));
                }
            }
        }

        Err(Error::ConversionFailed {
            input: input.to_path_buf(),
            attempts,
        })
    }
}

/// Check that `input` is an existing `.docx`, returning the PDF path it converts to
pub fn validate_docx(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let is_docx = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    if !is_docx {
        return Err(Error::NotDocx(input.to_path_buf()));
    }
    if !input.exists() {
        return Err(Error::FileNotFound(input.to_path_buf()));
    }

    let stem = input.file_stem().unwrap_or_default();
    let mut file_name = stem.to_os_string();
    file_name.push(".pdf");
    Ok(output_dir.join(file_name))
}

/// Run `command` to completion, killing it once `timeout` has elapsed
///
/// A timeout too large to represent as a deadline means no limit.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<()> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            return if status.success() {
                Ok(())
            } else {
                Err(Error::General(format!("exited with {}", status)))
            };
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            // Best effort: the process may have exited between the checks
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::General(format!(
                "timed out after {} seconds",
                timeout.as_secs_f32()
            )));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Locate an executable in the given directories, first match wins
fn find_executable_in(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    let extensions: &[&str] = if cfg!(windows) { &["exe", "cmd", "bat"] } else { &[] };

    dirs.into_iter().find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        extensions
            .iter()
            .map(|ext| candidate.with_extension(ext))
            .find(|path| path.is_file())
    })
}
