//! Header font selection and embedding
//!
//! The header prefers Arial when a TrueType file can be found on the host and
//! falls back to Helvetica, one of the 14 standard PDF fonts that every viewer
//! provides without embedding.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use rustybuzz::ttf_parser;
use tracing::debug;

use crate::error::{Error, Result};

/// First and last character codes covered by the Widths array
const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 126;

/// Width used for characters outside the covered range
const MISSING_WIDTH: u16 = 556;

/// Helvetica advance widths for codes 32..=126 in WinAnsiEncoding (1/1000 em)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];

/// Where Arial usually lives on hosts that ship it
#[cfg(target_os = "macos")]
const ARIAL_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];
#[cfg(target_os = "windows")]
const ARIAL_CANDIDATES: &[&str] = &["C:\\Windows\\Fonts\\arial.ttf"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const ARIAL_CANDIDATES: &[&str] = &[];

/// Which typeface the header should use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FontPreference {
    /// Arial when available on this host, Helvetica otherwise
    #[default]
    Auto,
    /// Always the standard Helvetica font
    Helvetica,
    /// A specific TrueType file; failing to load it is an error
    File(PathBuf),
}

impl FromStr for FontPreference {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            FontPreference::Auto
        } else if trimmed.eq_ignore_ascii_case("helvetica") {
            FontPreference::Helvetica
        } else {
            FontPreference::File(PathBuf::from(trimmed))
        })
    }
}

/// Font program data for an embedded TrueType font
#[derive(Debug, Clone)]
struct TrueTypeProgram {
    data: Vec<u8>,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    bbox: [i64; 4],
}

/// A resolved header font: its PDF name, glyph widths and optional program
#[derive(Debug, Clone)]
pub struct HeaderFont {
    base_font: String,
    /// Advance widths for FIRST_CHAR..=LAST_CHAR in 1/1000 em
    widths: Vec<u16>,
    program: Option<TrueTypeProgram>,
}

impl HeaderFont {
    /// The standard Helvetica font (not embedded)
    pub fn helvetica() -> Self {
        Self {
            base_font: "Helvetica".to_string(),
            widths: HELVETICA_WIDTHS.to_vec(),
            program: None,
        }
    }

    /// Build an embeddable font from TrueType data
    pub fn from_truetype(name: &str, data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| Error::Font(format!("{}: {}", name, e)))?;

        let units_per_em = f32::from(face.units_per_em().max(1));
        let scale = |v: i16| (f32::from(v) * 1000.0 / units_per_em).round() as i64;

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                face.glyph_index(char::from(code))
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| (f32::from(advance) * 1000.0 / units_per_em).round() as u16)
                    .unwrap_or(0)
            })
            .collect();

        let bbox = face.global_bounding_box();
        let program = TrueTypeProgram {
            ascent: scale(face.ascender()),
            descent: scale(face.descender()),
            cap_height: scale(face.capital_height().unwrap_or(face.ascender())),
            bbox: [scale(bbox.x_min), scale(bbox.y_min), scale(bbox.x_max), scale(bbox.y_max)],
            data,
        };

        let base_font: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if base_font.is_empty() {
            return Err(Error::Font(format!("Unusable font name: {:?}", name)));
        }

        Ok(Self {
            base_font,
            widths,
            program: Some(program),
        })
    }

    /// Load a TrueType font from disk, naming it after the file stem
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_truetype(&name, std::fs::read(path)?)
    }

    /// Pick the font for a preference, applying the Helvetica fallback for `Auto`
    pub fn resolve(preference: &FontPreference) -> Result<Self> {
        match preference {
            FontPreference::Helvetica => Ok(Self::helvetica()),
            FontPreference::File(path) => Self::load(path),
            FontPreference::Auto => {
                for candidate in ARIAL_CANDIDATES.iter().map(Path::new) {
                    if !candidate.exists() {
                        continue;
                    }
                    match Self::load(candidate) {
                        Ok(font) => {
                            debug!("Using header font {}", candidate.display());
                            return Ok(font.named("Arial"));
                        }
                        Err(e) => {
                            debug!("Skipping {}: {}", candidate.display(), e);
                            break;
                        }
                    }
                }
                debug!("Using standard Helvetica for the header");
                Ok(Self::helvetica())
            }
        }
    }

    fn named(mut self, base_font: &str) -> Self {
        self.base_font = base_font.to_string();
        self
    }

    /// PostScript name written as /BaseFont
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    /// Whether the font program gets embedded in the document
    pub fn is_embedded(&self) -> bool {
        self.program.is_some()
    }

    fn glyph_width(&self, c: char) -> u16 {
        u32::from(c)
            .checked_sub(u32::from(FIRST_CHAR))
            .and_then(|index| self.widths.get(index as usize))
            .copied()
            .unwrap_or(MISSING_WIDTH)
    }

    /// Width of `text` in points when set at `font_size`
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * font_size / 1000.0
    }

    /// Add the font (and its program, if embedded) to `doc`, returning the font dictionary id
    pub fn install(&self, doc: &mut Document) -> ObjectId {
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("BaseFont", Object::Name(self.base_font.as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

        let Some(program) = &self.program else {
            font.set("Subtype", Object::Name(b"Type1".to_vec()));
            return doc.add_object(Object::Dictionary(font));
        };

        let mut font_stream_dict = Dictionary::new();
        font_stream_dict.set("Length1", Object::Integer(program.data.len() as i64));
        let font_stream_id = doc.add_object(Stream::new(font_stream_dict, program.data.clone()));

        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", Object::Name(self.base_font.as_bytes().to_vec()));
        descriptor.set(
            "FontFamily",
            Object::String(self.base_font.as_bytes().to_vec(), StringFormat::Literal),
        );
        descriptor.set("Flags", Object::Integer(32)); // Nonsymbolic
        descriptor.set(
            "FontBBox",
            Object::Array(program.bbox.iter().copied().map(Object::Integer).collect()),
        );
        descriptor.set("ItalicAngle", Object::Integer(0));
        descriptor.set("Ascent", Object::Integer(program.ascent));
        descriptor.set("Descent", Object::Integer(program.descent));
        descriptor.set("CapHeight", Object::Integer(program.cap_height));
        descriptor.set("StemV", Object::Integer(80));
        descriptor.set("MissingWidth", Object::Integer(i64::from(MISSING_WIDTH)));
        descriptor.set("FontFile2", Object::Reference(font_stream_id));
        let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

        font.set("Subtype", Object::Name(b"TrueType".to_vec()));
        font.set("FirstChar", Object::Integer(i64::from(FIRST_CHAR)));
        font.set("LastChar", Object::Integer(i64::from(LAST_CHAR)));
        font.set(
            "Widths",
            Object::Array(self.widths.iter().map(|w| Object::Integer(i64::from(*w))).collect()),
        );
        font.set("FontDescriptor", Object::Reference(descriptor_id));

        doc.add_object(Object::Dictionary(font))
    }
}
