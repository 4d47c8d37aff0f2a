//! Output file naming conventions

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix for a single numbered file
pub const NUMBERED_SUFFIX: &str = "_iloveVerum";

/// Suffix for files written by folder batch numbering
pub const BATCH_SUFFIX: &str = "_numbered";

/// Output name used when none is given
pub const DEFAULT_MERGED_NAME: &str = "merged_output.pdf";

/// Name given to an upload that arrives without one
pub const DEFAULT_UPLOAD_NAME: &str = "file";

/// `dir/report.pdf` -> `dir/report_iloveVerum.pdf`
pub fn numbered_output_path(input: &Path) -> PathBuf {
    with_stem_suffix(input, NUMBERED_SUFFIX)
}

/// `dir/report.pdf` -> `dir/report_numbered.pdf`
pub fn batch_output_path(input: &Path) -> PathBuf {
    with_stem_suffix(input, BATCH_SUFFIX)
}

/// Whether `path` is itself the output of batch numbering
pub fn is_batch_output(path: &Path) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().ends_with(BATCH_SUFFIX))
}

/// Trim a user-supplied output name and make sure it ends in `.pdf`
///
/// An empty name falls back to [`DEFAULT_MERGED_NAME`].
pub fn normalize_output_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return DEFAULT_MERGED_NAME.to_string();
    }
    if has_pdf_extension(name) {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Apply [`normalize_output_name`] to the file name of `path`, keeping its folder
pub fn normalize_output_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let normalized = normalize_output_name(&name);

    match path.parent() {
        Some(parent) if path.file_name().is_some() => parent.join(normalized),
        _ => path.join(normalized),
    }
}

/// Rename repeated upload names so each can be staged in one folder
///
/// The first occurrence keeps its name; the n-th repeat gets `_n` appended to
/// its stem (`a.pdf`, `a_2.pdf`, `a_3.pdf`). Names without an extension get
/// the suffix at the end. Empty names become [`DEFAULT_UPLOAD_NAME`].
pub fn unique_input_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    names
        .iter()
        .map(|name| {
            let base = match name.as_ref() {
                "" => DEFAULT_UPLOAD_NAME,
                name => name,
            };
            let count = seen.entry(base).or_insert(0);
            *count += 1;
            if *count == 1 {
                return base.to_string();
            }

            match base.rsplit_once('.') {
                Some((stem, ext)) if !ext.is_empty() => format!("{}_{}.{}", stem, count, ext),
                Some((stem, _)) => format!("{}_{}", stem, count),
                None => format!("{}_{}", base, count),
            }
        })
        .collect()
}

fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn with_stem_suffix(input: &Path, suffix: &str) -> PathBuf {
    let mut file_name: OsString = input.file_stem().unwrap_or_default().to_os_string();
    file_name.push(suffix);
    file_name.push(".pdf");
    input.with_file_name(file_name)
}
