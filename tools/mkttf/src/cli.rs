//! Command line parsing and [`ConvertConfig`] construction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use engine::{EngineConfig, Tracer};

/// Description of a conversion: its inputs, metadata overrides, fixes to apply and engine
/// configuration.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConvertConfig {
    /// The BDF files to convert, sorted by ascending pixel size.
    pub bdf_files: Vec<PathBuf>,
    /// Metadata values replacing those of the base font.
    pub metadata: MetadataOverrides,
    /// Text appended to the copyright notice.
    pub append_copyright: Option<String>,
    /// Whether the largest font is imported into the glyph background.
    pub background: bool,
    /// Whether the OS/2 style bits are derived from the font weight.
    pub os2_table_tweaks: bool,
    /// Whether the Visual Studio fixes are applied.
    pub visual_studio_fixes: bool,
    /// The directory receiving the output files.
    pub output_dir: PathBuf,
    /// Whether the conversion is only simulated.
    pub dry_run: bool,
    /// The configuration of the font engine.
    pub engine: EngineConfig,
}

/// Metadata values given on the command line. `None` keeps the base font's value.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct MetadataOverrides {
    /// The font name.
    pub name: Option<String>,
    /// The family name.
    pub family: Option<String>,
    /// The full name, used for display.
    pub display_name: Option<String>,
    /// The weight.
    pub weight: Option<String>,
    /// The copyright notice.
    pub copyright: Option<String>,
    /// The font version.
    pub version: Option<String>,
}

/// Parses `mkttf`'s arguments to construct a [`ConvertConfig`].
pub fn get_config() -> ConvertConfig {
    parse_arguments(&command_parser().get_matches())
}

/// Parses the arguments required to produce a valid [`ConvertConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> ConvertConfig {
    let bdf_files = matches
        .get_many::<PathBuf>("bdf-file")
        .unwrap_or_else(|| unreachable!("`bdf-file` is a required argument"))
        .cloned()
        .collect();

    let string = |id: &str| matches.get_one::<String>(id).cloned();
    let metadata = MetadataOverrides {
        name: string("name"),
        family: string("family"),
        display_name: string("display-name"),
        weight: string("weight"),
        copyright: string("copyright"),
        version: string("font-version"),
    };

    let tracer = if matches.get_flag("prefer-autotrace") {
        Tracer::AutoTrace
    } else {
        Tracer::Potrace
    };

    let tracer_args = string("tracer-args")
        .unwrap_or_else(|| unreachable!("`tracer-args` should have a default value"));

    let executable = matches
        .get_one::<PathBuf>("fontforge")
        .cloned()
        .unwrap_or_else(|| unreachable!("`fontforge` should have a default value"));

    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| unreachable!("`output-dir` should have a default value"));

    ConvertConfig {
        bdf_files,
        metadata,
        append_copyright: string("append-copyright"),
        background: !matches.get_flag("no-background"),
        os2_table_tweaks: matches.get_flag("os2-table-tweaks"),
        visual_studio_fixes: matches.get_flag("visual-studio-fixes"),
        output_dir,
        dry_run: matches.get_flag("dry-run"),
        engine: EngineConfig {
            executable,
            tracer,
            tracer_args,
        },
    }
}

/// Returns the command parser for `mkttf`.
pub fn command_parser() -> Command {
    let bdf_file = Arg::new("bdf-file")
        .value_name("BDF_FILE")
        .help("BDF file to process")
        .value_parser(value_parser!(PathBuf))
        .num_args(1..)
        .required(true);

    let name = metadata_arg("name", 'n', "Font name to use for generated font");
    let family = metadata_arg("family", 'f', "Font family to use for generated font");
    let display_name = metadata_arg(
        "display-name",
        'N',
        "Full font name (for display) to use for generated font",
    );
    let weight = metadata_arg("weight", 'w', "Weight to use for generated font");
    let copyright = metadata_arg(
        "copyright",
        'c',
        "Copyright notice to use for generated font",
    );
    let font_version = metadata_arg(
        "font-version",
        'V',
        "Font version to use for generated font",
    );

    let append_copyright = Arg::new("append-copyright")
        .short('C')
        .long("append-copyright")
        .help("Text to append to the copyright notice taken from the first BDF file");

    let prefer_autotrace = Arg::new("prefer-autotrace")
        .short('a')
        .long("prefer-autotrace")
        .help("Prefer AutoTrace over Potrace, if possible")
        .action(ArgAction::SetTrue);

    let tracer_args = Arg::new("tracer-args")
        .short('A')
        .long("tracer-args")
        .help("Additional arguments for AutoTrace/Potrace")
        .allow_hyphen_values(true)
        .default_value("");

    let visual_studio_fixes = Arg::new("visual-studio-fixes")
        .short('s')
        .long("visual-studio-fixes")
        .help("Make generated font compatible with Visual Studio")
        .action(ArgAction::SetTrue);

    let os2_table_tweaks = Arg::new("os2-table-tweaks")
        .short('O')
        .long("os2-table-tweaks")
        .help(
            "Set the OS/2 table's style bits according to the font weight, for FontForge \
             versions which do not do this themselves",
        )
        .action(ArgAction::SetTrue);

    let no_background = Arg::new("no-background")
        .long("no-background")
        .help(
            "Do not import the largest font into the glyph background, keeping an existing \
             background",
        )
        .action(ArgAction::SetTrue);

    let output_dir = Arg::new("output-dir")
        .short('o')
        .long("output-dir")
        .help("Directory to write the TTF and SFD files to")
        .value_parser(value_parser!(PathBuf))
        .default_value(".");

    let fontforge = Arg::new("fontforge")
        .long("fontforge")
        .env("FONTFORGE")
        .help("FontForge executable to use")
        .value_parser(value_parser!(PathBuf))
        .default_value("fontforge");

    let dry_run = Arg::new("dry-run")
        .long("dry-run")
        .help("Load and process the fonts without FontForge, reporting what would be written")
        .action(ArgAction::SetTrue);

    Command::new("mkttf")
        .about(
            "Convert a set of BDF files into a TrueType font (TTF). The BDF files have to be \
             sorted by font size in ascending order.",
        )
        .arg(bdf_file)
        .arg(name)
        .arg(family)
        .arg(display_name)
        .arg(weight)
        .arg(copyright)
        .arg(append_copyright)
        .arg(font_version)
        .arg(prefer_autotrace)
        .arg(tracer_args)
        .arg(visual_studio_fixes)
        .arg(os2_table_tweaks)
        .arg(no_background)
        .arg(output_dir)
        .arg(fontforge)
        .arg(dry_run)
}

/// Returns an optional metadata override argument.
fn metadata_arg(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .help(format!("{help} (default: taken from first BDF file)"))
}
