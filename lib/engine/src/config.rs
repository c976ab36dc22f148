//! Process-wide engine configuration, fixed once when an engine is constructed.

use std::path::PathBuf;

/// Configuration handed to an engine when it is constructed. It is never mutated afterwards.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct EngineConfig {
    /// The FontForge executable to launch.
    pub executable: PathBuf,
    /// The preferred bitmap tracer.
    pub tracer: Tracer,
    /// Extra arguments passed verbatim to the tracer.
    pub tracer_args: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("fontforge"),
            tracer: Tracer::default(),
            tracer_args: String::new(),
        }
    }
}

/// The bitmap tracers FontForge knows how to invoke.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Tracer {
    /// Potrace, used unless AutoTrace is explicitly preferred.
    #[default]
    Potrace,
    /// AutoTrace.
    AutoTrace,
}

impl Tracer {
    /// Returns the textual representation of the [`Tracer`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Potrace => "potrace",
            Self::AutoTrace => "autotrace",
        }
    }
}
