//! Errors reported by font engines.

use std::{error, fmt, io, path::PathBuf};

/// Various errors that can occur while driving a font engine.
#[derive(Debug)]
pub enum EngineError {
    /// The engine process could not be launched.
    Launch {
        /// The executable which failed to launch.
        executable: PathBuf,
        /// The error reported by the operating system.
        error: io::Error,
    },
    /// An I/O error occurred locally, e.g. while reading a font or talking to the engine
    /// process.
    Io(io::Error),
    /// A BDF file could not be parsed.
    Bdf(bdf::Error),
    /// The engine reported that an operation failed.
    Failed {
        /// The class of failure.
        kind: FailureKind,
        /// The engine's description of the failure.
        message: String,
    },
    /// The engine process sent something that could not be understood, or went away.
    Protocol(String),
}

impl EngineError {
    /// Creates an [`EngineError::Failed`] of `kind`.
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<bdf::Error> for EngineError {
    fn from(value: bdf::Error) -> Self {
        Self::Bdf(value)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Protocol(value.to_string())
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch { executable, error } => {
                write!(f, "error launching `{}': {error}", executable.display())
            }
            Self::Io(error) => write!(f, "i/o error: {error}"),
            Self::Bdf(error) => write!(f, "malformed BDF file: {error}"),
            Self::Failed { kind, message } => write!(f, "{} error: {message}", kind.as_str()),
            Self::Protocol(message) => write!(f, "engine protocol error: {message}"),
        }
    }
}

impl error::Error for EngineError {}

/// Classes of failures reported by the engine itself.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum FailureKind {
    /// Reading or writing a file failed.
    Io,
    /// A glyph or attribute could not be found.
    Lookup,
    /// Any other failure.
    Other,
}

impl FailureKind {
    /// Returns the textual representation of the [`FailureKind`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "i/o",
            Self::Lookup => "lookup",
            Self::Other => "engine",
        }
    }
}
