//! The error type returned by [`convert`][c].
//!
//! [c]: crate::convert::convert

use std::{error, fmt, path::PathBuf};

use engine::EngineError;

/// Various errors that can abort a conversion.
#[derive(Debug)]
pub enum ConvertError {
    /// No BDF file was given.
    NoInput,
    /// The base font could not be opened.
    OpenBase {
        /// The base font.
        path: PathBuf,
        /// The underlying engine error.
        error: EngineError,
    },
    /// An additional strike could not be imported.
    ImportStrike {
        /// The BDF file containing the strike.
        path: PathBuf,
        /// The underlying engine error.
        error: EngineError,
    },
    /// The largest font could not be imported into the glyph background.
    ImportBackground {
        /// The BDF file containing the strike.
        path: PathBuf,
        /// The underlying engine error.
        error: EngineError,
    },
    /// OS/2 table tweaks were requested, but the engine lacks the style map field.
    StyleMapUnsupported,
    /// No OS/2 table tweaks are defined for the guessed weight.
    UnknownWeight(String),
    /// None of the substitution glyph candidates exist in the font.
    NoSubstitutionGlyph,
    /// An output file could not be written.
    WriteOutput {
        /// The output file.
        path: PathBuf,
        /// The underlying engine error.
        error: EngineError,
    },
    /// Any other engine operation failed.
    Engine(EngineError),
}

impl From<EngineError> for ConvertError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInput => write!(f, "no BDF files given"),
            Self::OpenBase { path, error } => {
                write!(f, "could not open base font `{}': {error}", path.display())
            }
            Self::ImportStrike { path, error } => write!(
                f,
                "could not import additional font `{}': {error}",
                path.display()
            ),
            Self::ImportBackground { path, error } => write!(
                f,
                "could not import font `{}' into glyph background: {error}",
                path.display()
            ),
            Self::StyleMapUnsupported => write!(
                f,
                "OS/2 table tweaks requested, but this FontForge version is too old to support \
                 them"
            ),
            Self::UnknownWeight(weight) => write!(
                f,
                "cannot tweak OS/2 table: no tweaks defined for guessed font weight `{weight}'"
            ),
            Self::NoSubstitutionGlyph => write!(
                f,
                "while applying Visual Studio fixes: could not find a substitution glyph"
            ),
            Self::WriteOutput { path, error } => {
                write!(f, "could not write `{}': {error}", path.display())
            }
            Self::Engine(error) => write!(f, "{error}"),
        }
    }
}

impl error::Error for ConvertError {}
