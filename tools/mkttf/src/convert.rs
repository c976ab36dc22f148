//! The conversion workflow: merge the strikes, adjust metadata, trace and write the outputs.

use std::path::PathBuf;

use engine::{EngineError, Font, FontEngine, MetadataField, OutputFormat};
use tracing::debug;

use crate::{
    cli::{ConvertConfig, MetadataOverrides},
    compat, os2,
    error::ConvertError,
};

/// The OS/2 vendor tag written to every font. FontForge omits the OS/2 table unless a vendor is
/// set before the table is modified in any other way.
pub const OS2_VENDOR: &str = "PfEd";

/// Accessor for the override of a single metadata field.
type OverrideAccessor = fn(&MetadataOverrides) -> Option<&str>;

/// Pairs every overridable metadata field with the accessor for its override.
const METADATA_OVERRIDES: [(MetadataField, OverrideAccessor); 6] = [
    (MetadataField::Name, |o| o.name.as_deref()),
    (MetadataField::Family, |o| o.family.as_deref()),
    (MetadataField::DisplayName, |o| o.display_name.as_deref()),
    (MetadataField::Weight, |o| o.weight.as_deref()),
    (MetadataField::Copyright, |o| o.copyright.as_deref()),
    (MetadataField::Version, |o| o.version.as_deref()),
];

/// The result of a successful conversion.
pub struct Conversion<F> {
    /// The converted font.
    pub font: F,
    /// The basename shared by the output files.
    pub basename: String,
    /// The generated TrueType font.
    pub ttf_path: PathBuf,
    /// The saved font source.
    pub sfd_path: PathBuf,
}

/// Converts the BDF files named by `config` into a TrueType font and a font source using
/// `engine`.
///
/// # Errors
///
/// Returns a [`ConvertError`] describing the first step that failed. Files written before the
/// failure are left in place.
pub fn convert<E: FontEngine>(
    engine: E,
    config: &ConvertConfig,
) -> Result<Conversion<E::Font>, ConvertError> {
    let Some((base, additional)) = config.bdf_files.split_first() else {
        return Err(ConvertError::NoInput);
    };

    let mut font = engine.open(base).map_err(|error| match error {
        error @ EngineError::Launch { .. } => ConvertError::Engine(error),
        error => ConvertError::OpenBase {
            path: base.clone(),
            error,
        },
    })?;

    println!(
        "Importing bitmaps from {} additional fonts...",
        additional.len()
    );
    for path in additional {
        font.import_bitmap(path, false)
            .map_err(|error| ConvertError::ImportStrike {
                path: path.clone(),
                error,
            })?;
    }

    let largest = additional.last().unwrap_or(base);
    if config.background {
        println!(
            "Importing font `{}' into glyph background...",
            largest.display()
        );
        font.import_bitmap(largest, true)
            .map_err(|error| ConvertError::ImportBackground {
                path: largest.clone(),
                error,
            })?;
    } else {
        println!(
            "Skipping import of font `{}' into glyph background, as requested.",
            largest.display()
        );
    }

    apply_metadata(&mut font, &config.metadata)?;
    if let Some(suffix) = &config.append_copyright {
        let mut copyright = font.metadata(MetadataField::Copyright)?;
        copyright.push_str(suffix);
        font.set_metadata(MetadataField::Copyright, &copyright)?;
    }

    font.set_os2_vendor(OS2_VENDOR)?;
    if config.os2_table_tweaks {
        os2::apply_style_tweaks(&mut font)?;
    }

    println!("Processing glyphs...");
    font.select_all()?;
    font.auto_trace()?;
    font.add_extrema()?;
    font.simplify()?;

    if config.visual_studio_fixes {
        compat::apply_visual_studio_fixes(&mut font)?;
    }

    let name = font.metadata(MetadataField::Name)?;
    let version = font.metadata(MetadataField::Version)?;
    let basename = output_basename(&name, &version);

    let format = OutputFormat::TrueType;
    let ttf_path = config
        .output_dir
        .join(format!("{basename}.{}", format.extension()));
    let sfd_path = config.output_dir.join(format!("{basename}.sfd"));

    println!("Saving TTF file...");
    font.generate(&ttf_path, format)
        .map_err(|error| ConvertError::WriteOutput {
            path: ttf_path.clone(),
            error,
        })?;

    println!("Saving SFD file...");
    font.save(&sfd_path)
        .map_err(|error| ConvertError::WriteOutput {
            path: sfd_path.clone(),
            error,
        })?;

    println!("Done!");
    Ok(Conversion {
        font,
        basename,
        ttf_path,
        sfd_path,
    })
}

/// Sets every metadata field which has an override in `overrides`, leaving the others as read
/// from the base font.
///
/// # Errors
///
/// Returns [`ConvertError::Engine`] if a field could not be set.
pub fn apply_metadata<F: Font>(
    font: &mut F,
    overrides: &MetadataOverrides,
) -> Result<(), ConvertError> {
    for (field, accessor) in METADATA_OVERRIDES {
        if let Some(value) = accessor(overrides) {
            debug!(%field, value, "overriding metadata");
            font.set_metadata(field, value)?;
        }
    }

    Ok(())
}

/// Returns the basename of the output files: the font name, followed by `-<version>` when the
/// version is not empty.
pub fn output_basename(name: &str, version: &str) -> String {
    if version.is_empty() {
        name.to_owned()
    } else {
        format!("{name}-{version}")
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use engine::{
        Encoding, EngineConfig, Font, FontEngine, GlyphSelector, MetadataField, StyleBits,
        Tracer,
        memory::{MemoryEngine, MemoryFont, Outline},
    };

    use crate::{
        cli::{ConvertConfig, MetadataOverrides},
        compat::{self, CP950_BIT, REQUIRED_CODE_POINTS},
        convert::{OS2_VENDOR, convert, output_basename},
        error::ConvertError,
        os2,
    };

    fn testdata(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../testdata")
            .join(name)
    }

    fn config(files: &[&str]) -> ConvertConfig {
        ConvertConfig {
            bdf_files: files.iter().map(|name| testdata(name)).collect(),
            metadata: MetadataOverrides::default(),
            append_copyright: None,
            background: true,
            os2_table_tweaks: false,
            visual_studio_fixes: false,
            output_dir: PathBuf::from("out"),
            dry_run: true,
            engine: EngineConfig::default(),
        }
    }

    fn run(config: &ConvertConfig) -> Result<MemoryFont, ConvertError> {
        let engine = MemoryEngine::new(config.engine.clone());
        convert(engine, config).map(|conversion| conversion.font)
    }

    #[test]
    fn basename_includes_non_empty_version() {
        assert_eq!(output_basename("TestFont", "1.0"), "TestFont-1.0");
        assert_eq!(output_basename("TestFont", ""), "TestFont");
    }

    #[test]
    fn merges_all_strikes_and_writes_named_outputs() {
        let mut config = config(&["8x8.bdf", "12x12.bdf", "16x16.bdf"]);
        config.metadata.name = Some("TestFont".to_owned());
        config.metadata.version = Some("1.0".to_owned());

        let engine = MemoryEngine::new(config.engine.clone());
        let conversion = convert(engine, &config).unwrap();

        assert_eq!(conversion.basename, "TestFont-1.0");
        assert_eq!(conversion.ttf_path, Path::new("out/TestFont-1.0.ttf"));
        assert_eq!(conversion.sfd_path, Path::new("out/TestFont-1.0.sfd"));

        let font = conversion.font;
        assert_eq!(
            font.outputs(),
            [
                PathBuf::from("out/TestFont-1.0.ttf"),
                PathBuf::from("out/TestFont-1.0.sfd")
            ]
        );

        let sizes: Vec<_> = font.strikes().iter().map(|s| s.pixel_size).collect();
        assert_eq!(sizes, [8, 12, 16]);
        assert_eq!(font.background().unwrap().path, testdata("16x16.bdf"));
    }

    #[test]
    fn background_import_can_be_skipped() {
        let mut config = config(&["8x8.bdf", "12x12.bdf", "16x16.bdf"]);
        config.background = false;

        let font = run(&config).unwrap();

        assert_eq!(font.strikes().len(), 3);
        assert!(font.background().is_none());
    }

    #[test]
    fn single_font_is_its_own_background() {
        let font = run(&config(&["8x8.bdf"])).unwrap();

        assert_eq!(font.strikes().len(), 1);
        assert_eq!(font.background().unwrap().path, testdata("8x8.bdf"));
    }

    #[test]
    fn metadata_is_inherited_without_overrides() {
        let mut font = run(&config(&["8x8.bdf", "16x16.bdf"])).unwrap();

        let mut base = MemoryEngine::default()
            .open(&testdata("8x8.bdf"))
            .unwrap();
        for field in MetadataField::ALL {
            assert_eq!(font.metadata(field).unwrap(), base.metadata(field).unwrap());
        }
        assert_eq!(font.outputs()[0], Path::new("out/Test-0.9.ttf"));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config = config(&["8x8.bdf"]);
        config.metadata.family = Some("Family".to_owned());
        config.metadata.weight = Some("Bold".to_owned());

        let mut font = run(&config).unwrap();

        assert_eq!(font.metadata(MetadataField::Family).unwrap(), "Family");
        assert_eq!(font.metadata(MetadataField::Weight).unwrap(), "Bold");
        assert_eq!(font.metadata(MetadataField::Name).unwrap(), "Test");
        assert_eq!(font.metadata(MetadataField::Version).unwrap(), "0.9");
    }

    #[test]
    fn copyright_is_appended_after_override() {
        let mut config = config(&["8x8.bdf"]);
        config.append_copyright = Some(", 2024 Someone".to_owned());

        let mut font = run(&config).unwrap();
        assert_eq!(
            font.metadata(MetadataField::Copyright).unwrap(),
            "CC0, 2024 Someone"
        );

        config.metadata.copyright = Some("(c) Me".to_owned());
        let mut font = run(&config).unwrap();
        assert_eq!(
            font.metadata(MetadataField::Copyright).unwrap(),
            "(c) Me, 2024 Someone"
        );
    }

    #[test]
    fn vendor_and_tracer_are_configured() {
        let mut config = config(&["8x8.bdf"]);
        config.engine.tracer = Tracer::AutoTrace;

        let font = run(&config).unwrap();

        assert_eq!(font.os2_vendor(), OS2_VENDOR);
        assert_eq!(font.tracer(), Tracer::AutoTrace);
    }

    #[test]
    fn all_glyphs_are_traced() {
        let font = run(&config(&["8x8.bdf", "16x16.bdf"])).unwrap();

        let traced = Outline::Traced {
            extrema: true,
            simplified: true,
        };
        for glyph in font.glyphs().iter().filter(|glyph| glyph.has_bitmap) {
            assert_eq!(glyph.outline, traced, "{}", glyph.name);
        }
    }

    #[test]
    fn missing_base_font_names_file() {
        let config = config(&["missing.bdf", "16x16.bdf"]);

        let error = run(&config).unwrap_err();

        assert!(matches!(error, ConvertError::OpenBase { .. }));
        assert!(error.to_string().contains("missing.bdf"));
    }

    #[test]
    fn missing_additional_font_names_file() {
        let config = config(&["8x8.bdf", "missing.bdf"]);

        let error = run(&config).unwrap_err();

        assert!(matches!(error, ConvertError::ImportStrike { .. }));
        assert!(error.to_string().contains("missing.bdf"));
    }

    #[test]
    fn os2_tweaks_use_bold_italic() {
        let mut config = config(&["8x8.bdf"]);
        config.os2_table_tweaks = true;
        config.metadata.name = Some("Test-BoldItalic".to_owned());
        config.metadata.weight = Some("Bold".to_owned());

        let mut font = run(&config).unwrap();

        assert_eq!(font.style_bits().unwrap(), StyleBits::new(0x221, 0x3));
    }

    #[test]
    fn os2_tweaks_reject_unknown_weight() {
        let mut config = config(&["8x8.bdf"]);
        config.os2_table_tweaks = true;
        config.metadata.weight = Some("Light".to_owned());

        let error = run(&config).unwrap_err();

        assert!(matches!(&error, ConvertError::UnknownWeight(weight) if weight == "light"));
    }

    #[test]
    fn os2_tweaks_require_style_map() {
        let mut config = config(&["8x8.bdf"]);
        config.os2_table_tweaks = true;

        let engine = MemoryEngine::new(config.engine.clone()).without_style_map();
        let result = convert(engine, &config);

        assert!(matches!(result, Err(ConvertError::StyleMapUnsupported)));
    }

    #[test]
    fn visual_studio_fixes_fill_required_glyphs() {
        let mut config = config(&["8x8.bdf", "16x16.bdf"]);
        config.visual_studio_fixes = true;

        let mut font = run(&config).unwrap();

        assert_eq!(font.encoding(), Some(Encoding::UnicodeBmp));
        assert_eq!(font.code_pages().unwrap(), [CP950_BIT, 0]);

        // Present in the 16x16 strike, so left alone.
        let existing = font.glyph(&GlyphSelector::CodePoint(0x3044)).unwrap();
        assert_eq!(existing.name, "uni3044");
        assert!(matches!(existing.outline, Outline::Traced { .. }));

        for code_point in &REQUIRED_CODE_POINTS[1..] {
            let glyph = font.glyph(&GlyphSelector::CodePoint(*code_point)).unwrap();
            assert_eq!(glyph.outline, Outline::Reference("uni0000".to_owned()));
        }
    }

    #[test]
    fn visual_studio_fixes_fall_back_to_question() {
        let mut config = config(&["12x12.bdf"]);
        config.visual_studio_fixes = true;

        let font = run(&config).unwrap();

        for code_point in REQUIRED_CODE_POINTS {
            let glyph = font.glyph(&GlyphSelector::CodePoint(code_point)).unwrap();
            assert_eq!(glyph.outline, Outline::Reference("question".to_owned()));
        }
    }

    #[test]
    fn visual_studio_fixes_fall_back_to_space() {
        let mut config = config(&["space-only.bdf"]);
        config.visual_studio_fixes = true;

        let font = run(&config).unwrap();

        for code_point in REQUIRED_CODE_POINTS {
            let glyph = font.glyph(&GlyphSelector::CodePoint(code_point)).unwrap();
            assert_eq!(glyph.outline, Outline::Reference("space".to_owned()));
        }
    }

    #[test]
    fn visual_studio_fixes_keep_high_code_page_bit() {
        let mut font = MemoryEngine::default()
            .open(&testdata("8x8.bdf"))
            .unwrap();
        font.set_code_pages([i32::MIN | 1, 0]).unwrap();

        compat::apply_visual_studio_fixes(&mut font).unwrap();

        assert_eq!(font.code_pages().unwrap(), [i32::MIN | CP950_BIT | 1, 0]);
    }

    #[test]
    fn os2_tweaks_leave_automatic_bits_alone() {
        let mut font = MemoryEngine::default()
            .open(&testdata("8x8.bdf"))
            .unwrap();
        font.set_style_bits(StyleBits::AUTOMATIC).unwrap();

        let added = os2::apply_style_tweaks(&mut font).unwrap();

        assert_eq!(added, StyleBits::new(0x40, 0));
        assert_eq!(font.style_bits().unwrap(), StyleBits::AUTOMATIC);
    }

    #[test]
    fn os2_tweaks_extend_existing_bits() {
        let mut font = MemoryEngine::default()
            .open(&testdata("8x8.bdf"))
            .unwrap();
        font.set_style_bits(StyleBits::new(0x80, 0x4)).unwrap();

        os2::apply_style_tweaks(&mut font).unwrap();

        assert_eq!(font.style_bits().unwrap(), StyleBits::new(0xC0, 0x4));
    }

    #[test]
    fn visual_studio_fixes_need_substitution_glyph() {
        let mut config = config(&["no-default.bdf"]);
        config.visual_studio_fixes = true;

        let error = run(&config).unwrap_err();

        assert!(matches!(error, ConvertError::NoSubstitutionGlyph));
    }
}
