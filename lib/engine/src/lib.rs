//! Interfaces for driving a font-editing engine that turns bitmap strikes into outline fonts.
//!
//! A [`FontEngine`] opens exactly one [`Font`], which is then mutated in place and finally
//! written out. Two engines are provided: [`fontforge::FontForgeEngine`], which drives a real
//! FontForge process, and [`memory::MemoryEngine`], which models the font in-process.

use std::{fmt, ops, path::Path};

use serde::Serialize;

pub mod config;
pub mod error;
pub mod fontforge;
pub mod memory;

pub use config::{EngineConfig, Tracer};
pub use error::{EngineError, FailureKind};

/// An engine capable of opening a bitmap font as the base of a new outline font.
pub trait FontEngine {
    /// The font handle produced by this engine.
    type Font: Font;

    /// Opens the bitmap font located at `path`, consuming the engine.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the engine could not be started or the font could not be
    /// read.
    fn open(self, path: &Path) -> Result<Self::Font, EngineError>;
}

/// A live font object owned by a [`FontEngine`].
///
/// Glyph operations act on the current selection, which is changed with [`Font::select_all`]
/// and [`Font::select`].
///
/// # Errors
///
/// Every method returns an [`EngineError`] if the engine fails to carry out the operation.
#[allow(clippy::missing_errors_doc, reason = "documented on the trait")]
pub trait Font {
    /// Imports the bitmap strike from the BDF file at `path`.
    ///
    /// If `background` is `true`, the strike is placed into the glyph background for use as
    /// an autotracing reference instead of being added as a strike.
    fn import_bitmap(&mut self, path: &Path, background: bool) -> Result<(), EngineError>;

    /// Returns the current value of the metadata `field`.
    fn metadata(&mut self, field: MetadataField) -> Result<String, EngineError>;

    /// Sets the metadata `field` to `value`.
    fn set_metadata(&mut self, field: MetadataField, value: &str) -> Result<(), EngineError>;

    /// Sets the vendor tag of the OS/2 table.
    fn set_os2_vendor(&mut self, vendor: &str) -> Result<(), EngineError>;

    /// Returns `true` if the engine exposes the OS/2 style map (fsSelection) field.
    fn has_style_map(&mut self) -> Result<bool, EngineError>;

    /// Returns the fsSelection and macStyle bits currently set.
    fn style_bits(&mut self) -> Result<StyleBits, EngineError>;

    /// Replaces the fsSelection and macStyle bits.
    fn set_style_bits(&mut self, bits: StyleBits) -> Result<(), EngineError>;

    /// Returns the two words of the OS/2 "code pages supported" bitfield.
    ///
    /// The words are signed, so a set bit 31 makes a word negative.
    fn code_pages(&mut self) -> Result<[i32; 2], EngineError>;

    /// Replaces the two words of the OS/2 "code pages supported" bitfield.
    fn set_code_pages(&mut self, code_pages: [i32; 2]) -> Result<(), EngineError>;

    /// Changes the encoding used to index glyphs.
    fn set_encoding(&mut self, encoding: Encoding) -> Result<(), EngineError>;

    /// Returns `true` if the font contains a glyph addressed by `selector`.
    fn contains(&mut self, selector: &GlyphSelector) -> Result<bool, EngineError>;

    /// Returns the name of the glyph addressed by `selector`.
    fn glyph_name(&mut self, selector: &GlyphSelector) -> Result<String, EngineError>;

    /// Selects every glyph.
    fn select_all(&mut self) -> Result<(), EngineError>;

    /// Replaces the selection with the glyph slot addressed by `selector`.
    fn select(&mut self, selector: &GlyphSelector) -> Result<(), EngineError>;

    /// Traces the bitmaps of the selected glyphs into outlines.
    fn auto_trace(&mut self) -> Result<(), EngineError>;

    /// Adds on-curve points at the extrema of the selected outlines.
    fn add_extrema(&mut self) -> Result<(), EngineError>;

    /// Removes redundant points from the selected outlines.
    fn simplify(&mut self) -> Result<(), EngineError>;

    /// Copies a reference to the selected glyph into the clipboard.
    fn copy_reference(&mut self) -> Result<(), EngineError>;

    /// Pastes the clipboard into the selected glyph slots.
    fn paste(&mut self) -> Result<(), EngineError>;

    /// Generates an outline font file of `format` at `path`.
    fn generate(&mut self, path: &Path, format: OutputFormat) -> Result<(), EngineError>;

    /// Saves the engine's editable font source at `path`.
    fn save(&mut self, path: &Path) -> Result<(), EngineError>;
}

/// The metadata fields which may be overridden by the user.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetadataField {
    /// The PostScript font name.
    Name,
    /// The family name.
    Family,
    /// The full name, used for display.
    DisplayName,
    /// The weight, e.g. `Medium` or `Bold`.
    Weight,
    /// The copyright notice.
    Copyright,
    /// The font version.
    Version,
}

impl MetadataField {
    /// Every [`MetadataField`], in the order in which they are applied.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Family,
        Self::DisplayName,
        Self::Weight,
        Self::Copyright,
        Self::Version,
    ];

    /// Returns the textual representation of the [`MetadataField`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Family => "family",
            Self::DisplayName => "display name",
            Self::Weight => "weight",
            Self::Copyright => "copyright",
            Self::Version => "version",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses a single glyph slot, either by code point or by glyph name.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GlyphSelector {
    /// A Unicode code point.
    CodePoint(u32),
    /// A glyph name such as `question`.
    Name(String),
}

impl fmt::Display for GlyphSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodePoint(code_point) => write!(f, "U+{code_point:04X}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// The fsSelection (style map) and macStyle bits of the OS/2 and head tables.
///
/// FontForge reports a field as `-1` while it derives the field itself. ORing bits into `-1`
/// leaves it at `-1`.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct StyleBits {
    /// The OS/2 fsSelection bits.
    pub fs_selection: i32,
    /// The macStyle bits.
    pub mac_style: i32,
}

impl StyleBits {
    /// Bits left for FontForge to derive.
    pub const AUTOMATIC: Self = Self::new(-1, -1);

    /// Creates a new [`StyleBits`].
    pub const fn new(fs_selection: i32, mac_style: i32) -> Self {
        Self {
            fs_selection,
            mac_style,
        }
    }
}

impl ops::BitOr for StyleBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            fs_selection: self.fs_selection | rhs.fs_selection,
            mac_style: self.mac_style | rhs.mac_style,
        }
    }
}

/// Glyph indexing encodings.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Encoding {
    /// Unicode, restricted to the Basic Multilingual Plane.
    UnicodeBmp,
}

impl Encoding {
    /// Returns the name under which the encoding is known to FontForge.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnicodeBmp => "iso10646-1",
        }
    }
}

/// Formats in which an outline font can be generated.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum OutputFormat {
    /// A TrueType font.
    TrueType,
}

impl OutputFormat {
    /// Returns the textual representation of the [`OutputFormat`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrueType => "ttf",
        }
    }

    /// Returns the file extension of the [`OutputFormat`].
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TrueType => "ttf",
        }
    }
}
