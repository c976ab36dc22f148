//! A [`FontEngine`] backed by a FontForge process.
//!
//! FontForge is launched with an embedded Python script which exposes its font object over a
//! line-based JSON protocol (see [`protocol`]). Every [`Font`] operation is a single round trip,
//! so queries always reflect the live FontForge font.

use std::path::Path;

use serde_json::{Value, json};
use tracing::debug;

use crate::{
    Encoding, EngineConfig, EngineError, Font, FontEngine, GlyphSelector, MetadataField,
    OutputFormat, StyleBits, Tracer,
    fontforge::{
        protocol::{Attribute, Request},
        session::Session,
    },
};

pub mod protocol;
pub mod session;

/// A [`FontEngine`] which drives FontForge.
#[derive(Clone, Debug)]
pub struct FontForgeEngine {
    /// The configuration applied when FontForge is launched.
    config: EngineConfig,
}

impl FontForgeEngine {
    /// Creates a new [`FontForgeEngine`] which applies `config` to every FontForge process it
    /// launches.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl FontEngine for FontForgeEngine {
    type Font = FontForgeFont;

    fn open(self, path: &Path) -> Result<Self::Font, EngineError> {
        let mut session = Session::spawn(&self.config)?;

        debug!(
            tracer = self.config.tracer.as_str(),
            tracer_args = %self.config.tracer_args,
            "configuring tracer"
        );
        session.call(&Request::SetPrefs {
            prefer_potrace: self.config.tracer == Tracer::Potrace,
            tracer_args: &self.config.tracer_args,
        })?;
        session.call(&Request::Open { path })?;

        Ok(FontForgeFont { session })
    }
}

/// A font open in a FontForge process.
pub struct FontForgeFont {
    /// The FontForge process holding the font.
    session: Session,
}

impl FontForgeFont {
    /// Reads `attr` from the font.
    fn get(&mut self, attr: Attribute) -> Result<Value, EngineError> {
        self.session.call(&Request::GetAttr { attr })
    }

    /// Writes `value` to `attr`.
    fn set(&mut self, attr: Attribute, value: Value) -> Result<(), EngineError> {
        self.session
            .call(&Request::SetAttr { attr, value })
            .map(|_| ())
    }

    /// Reads `attr` as a signed 32-bit integer.
    fn get_i32(&mut self, attr: Attribute) -> Result<i32, EngineError> {
        let value = self.get(attr)?;
        value
            .as_i64()
            .and_then(|value| i32::try_from(value).ok())
            .ok_or_else(|| unexpected(attr, &value))
    }

    /// Runs `request`, discarding its result.
    fn run(&mut self, request: Request<'_>) -> Result<(), EngineError> {
        self.session.call(&request).map(|_| ())
    }
}

impl Font for FontForgeFont {
    fn import_bitmap(&mut self, path: &Path, background: bool) -> Result<(), EngineError> {
        self.run(Request::ImportBitmap { path, background })
    }

    fn metadata(&mut self, field: MetadataField) -> Result<String, EngineError> {
        let attr = Attribute::from(field);
        match self.get(attr)? {
            Value::String(value) => Ok(value),
            // Unset metadata is reported as `None` by older FontForge releases.
            Value::Null => Ok(String::new()),
            value => Err(unexpected(attr, &value)),
        }
    }

    fn set_metadata(&mut self, field: MetadataField, value: &str) -> Result<(), EngineError> {
        self.set(Attribute::from(field), json!(value))
    }

    fn set_os2_vendor(&mut self, vendor: &str) -> Result<(), EngineError> {
        self.set(Attribute::Os2Vendor, json!(vendor))
    }

    fn has_style_map(&mut self) -> Result<bool, EngineError> {
        let attr = Attribute::Os2StyleMap;
        let value = self.session.call(&Request::HasAttr { attr })?;
        value.as_bool().ok_or_else(|| unexpected(attr, &value))
    }

    fn style_bits(&mut self) -> Result<StyleBits, EngineError> {
        let fs_selection = self.get_i32(Attribute::Os2StyleMap)?;
        let mac_style = self.get_i32(Attribute::MacStyle)?;
        Ok(StyleBits::new(fs_selection, mac_style))
    }

    fn set_style_bits(&mut self, bits: StyleBits) -> Result<(), EngineError> {
        self.set(Attribute::Os2StyleMap, json!(bits.fs_selection))?;
        self.set(Attribute::MacStyle, json!(bits.mac_style))
    }

    fn code_pages(&mut self) -> Result<[i32; 2], EngineError> {
        let attr = Attribute::Os2CodePages;
        let value = self.get(attr)?;
        serde_json::from_value(value.clone()).map_err(|_| unexpected(attr, &value))
    }

    fn set_code_pages(&mut self, code_pages: [i32; 2]) -> Result<(), EngineError> {
        self.set(Attribute::Os2CodePages, json!(code_pages))
    }

    fn set_encoding(&mut self, encoding: Encoding) -> Result<(), EngineError> {
        self.set(Attribute::Encoding, json!(encoding.as_str()))
    }

    fn contains(&mut self, selector: &GlyphSelector) -> Result<bool, EngineError> {
        let value = self.session.call(&Request::Contains { selector })?;
        value.as_bool().ok_or_else(|| {
            EngineError::Protocol(format!("expected a boolean for {selector}, got {value}"))
        })
    }

    fn glyph_name(&mut self, selector: &GlyphSelector) -> Result<String, EngineError> {
        match self.session.call(&Request::GlyphName { selector })? {
            Value::String(name) => Ok(name),
            value => Err(EngineError::Protocol(format!(
                "expected a glyph name for {selector}, got {value}"
            ))),
        }
    }

    fn select_all(&mut self) -> Result<(), EngineError> {
        self.run(Request::SelectAll)
    }

    fn select(&mut self, selector: &GlyphSelector) -> Result<(), EngineError> {
        self.run(Request::Select { selector })
    }

    fn auto_trace(&mut self) -> Result<(), EngineError> {
        self.run(Request::AutoTrace)
    }

    fn add_extrema(&mut self) -> Result<(), EngineError> {
        self.run(Request::AddExtrema)
    }

    fn simplify(&mut self) -> Result<(), EngineError> {
        self.run(Request::Simplify)
    }

    fn copy_reference(&mut self) -> Result<(), EngineError> {
        self.run(Request::CopyReference)
    }

    fn paste(&mut self) -> Result<(), EngineError> {
        self.run(Request::Paste)
    }

    fn generate(&mut self, path: &Path, format: OutputFormat) -> Result<(), EngineError> {
        self.run(Request::Generate {
            path,
            format: format.as_str(),
        })
    }

    fn save(&mut self, path: &Path) -> Result<(), EngineError> {
        self.run(Request::Save { path })
    }
}

/// Returns the error reported when `attr` holds a value of an unexpected type.
fn unexpected(attr: Attribute, value: &Value) -> EngineError {
    EngineError::Protocol(format!("unexpected value for {attr:?}: {value}"))
}

#[cfg(all(test, unix))]
mod test {
    use std::{
        fs,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
        process::Command,
    };

    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::{
        Encoding, EngineConfig, EngineError, FailureKind, Font, FontEngine, GlyphSelector,
        MetadataField, OutputFormat, StyleBits,
        fontforge::FontForgeEngine,
    };

    fn testdata(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../testdata")
            .join(name)
    }

    fn has_python() -> bool {
        Command::new("python3")
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    /// Writes an executable to `dir` which runs the bridge script against the stand-in
    /// `fontforge` module, logging to `dir/calls`.
    fn fake_fontforge(dir: &TempDir) -> PathBuf {
        let executable = dir.path().join("fontforge");
        let script = format!(
            "#!/bin/sh\nPYTHONPATH='{}' FONTFORGE_STUB_LOG='{}' exec python3 \"$3\"\n",
            testdata("fontforge").display(),
            dir.path().join("calls").display(),
        );
        write_executable(&executable, &script);
        executable
    }

    fn write_executable(path: &Path, script: &str) {
        fs::write(path, script).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn engine(executable: PathBuf) -> FontForgeEngine {
        FontForgeEngine::new(EngineConfig {
            executable,
            ..EngineConfig::default()
        })
    }

    fn calls(dir: &TempDir) -> Vec<Value> {
        fs::read_to_string(dir.path().join("calls"))
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn operations_reach_fontforge_in_order() {
        if !has_python() {
            eprintln!("python3 not found, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let base = testdata("8x8.bdf");
        let strike = testdata("12x12.bdf");
        let ttf = dir.path().join("TestFont-1.0.ttf");
        let sfd = dir.path().join("TestFont-1.0.sfd");

        let mut font = engine(fake_fontforge(&dir)).open(&base).unwrap();
        font.import_bitmap(&strike, false).unwrap();
        font.import_bitmap(&strike, true).unwrap();

        assert_eq!(font.metadata(MetadataField::Name).unwrap(), "TestFont");
        assert_eq!(font.metadata(MetadataField::Version).unwrap(), "1.0");
        font.set_metadata(MetadataField::Copyright, "CC0, Someone").unwrap();
        font.set_os2_vendor("PfEd").unwrap();

        assert!(font.has_style_map().unwrap());
        let bits = font.style_bits().unwrap();
        assert_eq!(bits, StyleBits::AUTOMATIC);
        font.set_style_bits(bits | StyleBits::new(0x20, 0x1)).unwrap();

        font.set_encoding(Encoding::UnicodeBmp).unwrap();
        let [low, high] = font.code_pages().unwrap();
        assert_eq!([low, high], [i32::MIN | 1, 0]);
        font.set_code_pages([low | 1 << 20, high]).unwrap();

        let question = GlyphSelector::Name("question".to_owned());
        assert!(!font.contains(&GlyphSelector::CodePoint(0)).unwrap());
        assert!(font.contains(&question).unwrap());
        assert_eq!(
            font.glyph_name(&GlyphSelector::CodePoint(0x3F)).unwrap(),
            "question"
        );

        font.select_all().unwrap();
        font.auto_trace().unwrap();
        font.add_extrema().unwrap();
        font.simplify().unwrap();
        font.select(&question).unwrap();
        font.copy_reference().unwrap();
        font.select(&GlyphSelector::CodePoint(0x3044)).unwrap();
        font.paste().unwrap();

        font.generate(&ttf, OutputFormat::TrueType).unwrap();
        font.save(&sfd).unwrap();
        drop(font);

        assert!(ttf.is_file());
        assert!(sfd.is_file());
        assert_eq!(
            calls(&dir),
            [
                json!(["setPrefs", "PreferPotrace", true]),
                json!(["setPrefs", "AutotraceArgs", ""]),
                json!(["open", path_str(&base)]),
                json!(["importBitmaps", path_str(&strike), false]),
                json!(["importBitmaps", path_str(&strike), true]),
                json!(["set", "copyright", "CC0, Someone"]),
                json!(["set", "os2_vendor", "PfEd"]),
                json!(["set", "os2_stylemap", -1]),
                json!(["set", "macstyle", -1]),
                json!(["set", "encoding", "iso10646-1"]),
                json!(["set", "os2_codepages", [-2_146_435_071, 0]]),
                json!(["selection.all"]),
                json!(["autoTrace"]),
                json!(["addExtrema"]),
                json!(["simplify"]),
                json!(["selection.select", "question"]),
                json!(["copyReference"]),
                json!(["selection.select", 0x3044]),
                json!(["paste"]),
                json!(["generate", path_str(&ttf), "ttf"]),
                json!(["save", path_str(&sfd)]),
                json!(["close"]),
            ]
        );
    }

    #[test]
    fn fontforge_failures_keep_their_kind() {
        if !has_python() {
            eprintln!("python3 not found, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let engine = engine(fake_fontforge(&dir));

        let mut font = engine.clone().open(&testdata("8x8.bdf")).unwrap();
        let error = font
            .import_bitmap(&testdata("missing.bdf"), false)
            .unwrap_err();
        assert!(matches!(
            error,
            EngineError::Failed {
                kind: FailureKind::Io,
                ..
            }
        ));

        let error = font
            .glyph_name(&GlyphSelector::CodePoint(0x3044))
            .unwrap_err();
        assert!(matches!(
            error,
            EngineError::Failed {
                kind: FailureKind::Lookup,
                ..
            }
        ));
        drop(font);

        let error = engine.open(&testdata("missing.bdf")).err().unwrap();
        assert!(matches!(
            error,
            EngineError::Failed {
                kind: FailureKind::Io,
                ..
            }
        ));
    }

    #[test]
    fn missing_executable_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let executable = dir.path().join("no-such-fontforge");

        let error = engine(executable.clone())
            .open(&testdata("8x8.bdf"))
            .err()
            .unwrap();

        assert!(
            matches!(error, EngineError::Launch { executable: ref path, .. } if *path == executable)
        );
    }

    #[test]
    fn early_exit_is_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let executable = dir.path().join("fontforge");
        write_executable(&executable, "#!/bin/sh\nread request\nexit 3\n");

        let error = engine(executable).open(&testdata("8x8.bdf")).err().unwrap();

        match error {
            EngineError::Protocol(message) => {
                assert!(message.contains("fontforge exited unexpectedly"), "{message}");
            }
            error => panic!("unexpected error: {error:?}"),
        }
    }
}
