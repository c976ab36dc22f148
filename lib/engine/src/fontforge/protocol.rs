//! Messages exchanged with the FontForge bridge script.
//!
//! Every [`Request`] is sent as a single line of JSON. The bridge answers each one with a single
//! line containing a [`Reply`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EngineError, FailureKind, GlyphSelector, MetadataField};

/// A request for the bridge to carry out a single operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request<'a> {
    /// Sets the tracer preferences. Must precede [`Request::Open`].
    SetPrefs {
        /// Whether Potrace should be preferred over AutoTrace.
        prefer_potrace: bool,
        /// Extra arguments passed to the tracer.
        tracer_args: &'a str,
    },
    /// Opens the base font.
    Open {
        /// The font to open.
        path: &'a Path,
    },
    /// Imports a bitmap strike into the open font.
    ImportBitmap {
        /// The BDF file to import.
        path: &'a Path,
        /// Whether the strike goes into the glyph background.
        background: bool,
    },
    /// Reads an attribute of the font.
    GetAttr {
        /// The attribute to read.
        attr: Attribute,
    },
    /// Writes an attribute of the font.
    SetAttr {
        /// The attribute to write.
        attr: Attribute,
        /// The new value.
        value: serde_json::Value,
    },
    /// Checks whether the font object has an attribute.
    HasAttr {
        /// The attribute to look for.
        attr: Attribute,
    },
    /// Checks whether a glyph exists.
    Contains {
        /// The glyph to look for.
        selector: &'a GlyphSelector,
    },
    /// Returns the name of a glyph.
    GlyphName {
        /// The glyph to look up.
        selector: &'a GlyphSelector,
    },
    /// Selects all glyphs.
    SelectAll,
    /// Selects a single glyph slot.
    Select {
        /// The glyph slot to select.
        selector: &'a GlyphSelector,
    },
    /// Traces the selected glyphs.
    AutoTrace,
    /// Adds extrema points to the selected glyphs.
    AddExtrema,
    /// Simplifies the selected glyphs.
    Simplify,
    /// Copies a reference to the selected glyph.
    CopyReference,
    /// Pastes into the selected glyph slots.
    Paste,
    /// Generates an outline font.
    Generate {
        /// The output path.
        path: &'a Path,
        /// The output format, as understood by FontForge.
        format: &'static str,
    },
    /// Saves the font source.
    Save {
        /// The output path.
        path: &'a Path,
    },
    /// Closes the font and terminates the bridge.
    Close,
}

/// Font attributes accessible through [`Request::GetAttr`] and [`Request::SetAttr`].
///
/// The serialized names are FontForge's attribute names.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize)]
pub enum Attribute {
    /// The PostScript font name.
    #[serde(rename = "fontname")]
    FontName,
    /// The family name.
    #[serde(rename = "familyname")]
    FamilyName,
    /// The full name.
    #[serde(rename = "fullname")]
    FullName,
    /// The weight.
    #[serde(rename = "weight")]
    Weight,
    /// The copyright notice.
    #[serde(rename = "copyright")]
    Copyright,
    /// The version.
    #[serde(rename = "version")]
    Version,
    /// The OS/2 vendor tag.
    #[serde(rename = "os2_vendor")]
    Os2Vendor,
    /// The OS/2 fsSelection field.
    #[serde(rename = "os2_stylemap")]
    Os2StyleMap,
    /// The macStyle field.
    #[serde(rename = "macstyle")]
    MacStyle,
    /// The OS/2 supported code pages.
    #[serde(rename = "os2_codepages")]
    Os2CodePages,
    /// The glyph indexing encoding.
    #[serde(rename = "encoding")]
    Encoding,
}

impl From<MetadataField> for Attribute {
    fn from(value: MetadataField) -> Self {
        match value {
            MetadataField::Name => Self::FontName,
            MetadataField::Family => Self::FamilyName,
            MetadataField::DisplayName => Self::FullName,
            MetadataField::Weight => Self::Weight,
            MetadataField::Copyright => Self::Copyright,
            MetadataField::Version => Self::Version,
        }
    }
}

/// The bridge's answer to a [`Request`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    /// The request succeeded, yielding a value (`null` for operations without a result).
    Ok(serde_json::Value),
    /// The request failed.
    Error {
        /// The class of failure.
        kind: ReplyErrorKind,
        /// A description of the failure.
        message: String,
    },
}

impl Reply {
    /// Converts the [`Reply`] into the value of a successful request.
    pub fn into_result(self) -> Result<serde_json::Value, EngineError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error { kind, message } => Err(EngineError::failed(kind.into(), message)),
        }
    }
}

/// The failure classes reported by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyErrorKind {
    /// An `EnvironmentError` was raised.
    Io,
    /// A lookup failed.
    Lookup,
    /// Any other exception.
    Other,
}

impl From<ReplyErrorKind> for FailureKind {
    fn from(value: ReplyErrorKind) -> Self {
        match value {
            ReplyErrorKind::Io => Self::Io,
            ReplyErrorKind::Lookup => Self::Lookup,
            ReplyErrorKind::Other => Self::Other,
        }
    }
}
