//! A [`FontEngine`] which models the font in-process.
//!
//! BDF files are read with the [`bdf`] crate. Metadata, OS/2 fields, glyph slots, strikes and
//! the glyph background are tracked faithfully, while tracing only marks outlines as traced and
//! output files are recorded rather than written. This makes it suitable for previewing a
//! conversion without FontForge.

use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    Encoding, EngineConfig, EngineError, FailureKind, Font, FontEngine, GlyphSelector,
    MetadataField, OutputFormat, StyleBits, Tracer,
};

/// Weights which FontForge leaves out of derived font names.
const REGULAR_WEIGHTS: [&str; 4] = ["medium", "regular", "normal", "book"];

/// A [`FontEngine`] which keeps the font in memory.
#[derive(Clone, Debug)]
pub struct MemoryEngine {
    /// The engine configuration.
    config: EngineConfig,
    /// Whether fonts expose the OS/2 style map field.
    style_map: bool,
}

impl MemoryEngine {
    /// Creates a new [`MemoryEngine`] configured with `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            style_map: true,
        }
    }

    /// Makes fonts opened by this engine lack the OS/2 style map field, as in old FontForge
    /// releases.
    pub fn without_style_map(mut self) -> Self {
        self.style_map = false;
        self
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl FontEngine for MemoryEngine {
    type Font = MemoryFont;

    fn open(self, path: &Path) -> Result<Self::Font, EngineError> {
        let bdf = read_bdf(path)?;
        let strike = Strike::from_bdf(path, &bdf);

        let family =
            string_property(&bdf, "FAMILY_NAME").unwrap_or_else(|| bdf.name().to_owned());
        let weight =
            string_property(&bdf, "WEIGHT_NAME").unwrap_or_else(|| "Medium".to_owned());
        let regular = REGULAR_WEIGHTS.contains(&weight.to_lowercase().as_str());

        let mut name: String = family.split_whitespace().collect();
        let mut display_name = family.clone();
        if !regular {
            name = format!("{name}-{weight}");
            display_name = format!("{display_name} {weight}");
        }
        if let Some(full_name) = string_property(&bdf, "FULL_NAME") {
            display_name = full_name;
        }

        let metadata = BTreeMap::from([
            (MetadataField::Name, name),
            (MetadataField::Family, family),
            (MetadataField::DisplayName, display_name),
            (MetadataField::Weight, weight),
            (
                MetadataField::Copyright,
                string_property(&bdf, "COPYRIGHT").unwrap_or_default(),
            ),
            (
                MetadataField::Version,
                string_property(&bdf, "FONT_VERSION").unwrap_or_default(),
            ),
        ]);

        let mut font = MemoryFont {
            config: self.config,
            style_map: self.style_map,
            metadata,
            os2_vendor: String::new(),
            style_bits: StyleBits::default(),
            code_pages: [0; 2],
            encoding: None,
            glyphs: Vec::new(),
            code_points: BTreeMap::new(),
            strikes: Vec::new(),
            background: None,
            selection: Vec::new(),
            clipboard: None,
            outputs: Vec::new(),
        };
        font.merge_glyphs(&bdf);
        font.strikes.push(strike);

        Ok(font)
    }
}

/// A font held in memory by a [`MemoryEngine`].
#[derive(Clone, Debug)]
pub struct MemoryFont {
    /// The configuration of the engine which opened the font.
    config: EngineConfig,
    /// Whether the OS/2 style map field is exposed.
    style_map: bool,
    /// The overridable metadata fields.
    metadata: BTreeMap<MetadataField, String>,
    /// The OS/2 vendor tag.
    os2_vendor: String,
    /// The fsSelection and macStyle bits.
    style_bits: StyleBits,
    /// The OS/2 supported code pages.
    code_pages: [i32; 2],
    /// The glyph encoding, or `None` for the encoding read from the base font.
    encoding: Option<Encoding>,
    /// Every glyph, in code point order of first appearance.
    glyphs: Vec<Glyph>,
    /// Index of every encoded glyph in `glyphs`, by code point.
    code_points: BTreeMap<u32, usize>,
    /// The bitmap strikes, in import order.
    strikes: Vec<Strike>,
    /// The strike imported into the glyph background.
    background: Option<Strike>,
    /// The selected glyph slots.
    selection: Vec<GlyphSelector>,
    /// The name of the glyph whose reference was copied.
    clipboard: Option<String>,
    /// Files which would have been written, in order.
    outputs: Vec<PathBuf>,
}

impl MemoryFont {
    /// Returns the tracer the font would be traced with.
    pub fn tracer(&self) -> Tracer {
        self.config.tracer
    }

    /// Returns the OS/2 vendor tag.
    pub fn os2_vendor(&self) -> &str {
        &self.os2_vendor
    }

    /// Returns the glyph encoding, or `None` if the base font's encoding is still in use.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Returns the bitmap strikes in import order.
    pub fn strikes(&self) -> &[Strike] {
        &self.strikes
    }

    /// Returns the strike imported into the glyph background, if any.
    pub fn background(&self) -> Option<&Strike> {
        self.background.as_ref()
    }

    /// Returns every glyph of the font.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Returns the glyph addressed by `selector`.
    pub fn glyph(&self, selector: &GlyphSelector) -> Option<&Glyph> {
        self.position(selector).map(|index| &self.glyphs[index])
    }

    /// Returns the files the font would have been written to, in order.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Returns the index of the glyph addressed by `selector`.
    fn position(&self, selector: &GlyphSelector) -> Option<usize> {
        match selector {
            GlyphSelector::CodePoint(code_point) => self.code_points.get(code_point).copied(),
            GlyphSelector::Name(_) => {
                self.glyphs.iter().position(|glyph| glyph.matches(selector))
            }
        }
    }

    /// Appends `glyph` to the font.
    fn push_glyph(&mut self, glyph: Glyph) {
        if let Some(code_point) = glyph.code_point {
            self.code_points.insert(code_point, self.glyphs.len());
        }
        self.glyphs.push(glyph);
    }

    /// Adds the glyphs of `bdf` which are not yet part of the font.
    fn merge_glyphs(&mut self, bdf: &bdf::Font) {
        let mut incoming: Vec<_> = bdf.glyphs().iter().collect();
        incoming.sort_by_key(|(c, _)| **c);

        for (c, bdf_glyph) in incoming {
            let selector = GlyphSelector::CodePoint(u32::from(*c));
            let has_bitmap = has_pixels(bdf_glyph);
            match self.position(&selector) {
                Some(index) => self.glyphs[index].has_bitmap |= has_bitmap,
                None => self.push_glyph(Glyph {
                    name: bdf_glyph.name().to_owned(),
                    code_point: Some(u32::from(*c)),
                    has_bitmap,
                    outline: Outline::Empty,
                }),
            }
        }
    }

    /// Returns the indices of every selected glyph which exists.
    fn selected_glyphs(&self) -> Vec<usize> {
        self.selection
            .iter()
            .filter_map(|selector| self.position(selector))
            .collect()
    }

    /// Applies `f` to the outline of every selected glyph which has been traced.
    fn update_traced(&mut self, f: impl Fn(&mut bool, &mut bool)) {
        for index in self.selected_glyphs() {
            if let Outline::Traced {
                extrema,
                simplified,
            } = &mut self.glyphs[index].outline
            {
                f(extrema, simplified);
            }
        }
    }
}

impl Font for MemoryFont {
    fn import_bitmap(&mut self, path: &Path, background: bool) -> Result<(), EngineError> {
        let bdf = read_bdf(path)?;
        let strike = Strike::from_bdf(path, &bdf);
        debug!(path = %path.display(), background, "importing strike");

        if background {
            self.background = Some(strike);
        } else {
            self.merge_glyphs(&bdf);
            self.strikes.push(strike);
        }

        Ok(())
    }

    fn metadata(&mut self, field: MetadataField) -> Result<String, EngineError> {
        Ok(self.metadata.get(&field).cloned().unwrap_or_default())
    }

    fn set_metadata(&mut self, field: MetadataField, value: &str) -> Result<(), EngineError> {
        self.metadata.insert(field, value.to_owned());
        Ok(())
    }

    fn set_os2_vendor(&mut self, vendor: &str) -> Result<(), EngineError> {
        vendor.clone_into(&mut self.os2_vendor);
        Ok(())
    }

    fn has_style_map(&mut self) -> Result<bool, EngineError> {
        Ok(self.style_map)
    }

    fn style_bits(&mut self) -> Result<StyleBits, EngineError> {
        if !self.style_map {
            return Err(EngineError::failed(
                FailureKind::Lookup,
                "font has no attribute `os2_stylemap'",
            ));
        }

        Ok(self.style_bits)
    }

    fn set_style_bits(&mut self, bits: StyleBits) -> Result<(), EngineError> {
        if !self.style_map {
            return Err(EngineError::failed(
                FailureKind::Lookup,
                "font has no attribute `os2_stylemap'",
            ));
        }

        self.style_bits = bits;
        Ok(())
    }

    fn code_pages(&mut self) -> Result<[i32; 2], EngineError> {
        Ok(self.code_pages)
    }

    fn set_code_pages(&mut self, code_pages: [i32; 2]) -> Result<(), EngineError> {
        self.code_pages = code_pages;
        Ok(())
    }

    fn set_encoding(&mut self, encoding: Encoding) -> Result<(), EngineError> {
        self.encoding = Some(encoding);
        Ok(())
    }

    fn contains(&mut self, selector: &GlyphSelector) -> Result<bool, EngineError> {
        Ok(self.position(selector).is_some())
    }

    fn glyph_name(&mut self, selector: &GlyphSelector) -> Result<String, EngineError> {
        self.glyph(selector)
            .map(|glyph| glyph.name.clone())
            .ok_or_else(|| EngineError::failed(FailureKind::Lookup, format!("no glyph {selector}")))
    }

    fn select_all(&mut self) -> Result<(), EngineError> {
        self.selection = self.glyphs.iter().map(Glyph::selector).collect();
        Ok(())
    }

    fn select(&mut self, selector: &GlyphSelector) -> Result<(), EngineError> {
        self.selection = vec![selector.clone()];
        Ok(())
    }

    fn auto_trace(&mut self) -> Result<(), EngineError> {
        for index in self.selected_glyphs() {
            let glyph = &mut self.glyphs[index];
            if glyph.has_bitmap {
                glyph.outline = Outline::Traced {
                    extrema: false,
                    simplified: false,
                };
            }
        }

        Ok(())
    }

    fn add_extrema(&mut self) -> Result<(), EngineError> {
        self.update_traced(|extrema, _| *extrema = true);
        Ok(())
    }

    fn simplify(&mut self) -> Result<(), EngineError> {
        self.update_traced(|_, simplified| *simplified = true);
        Ok(())
    }

    fn copy_reference(&mut self) -> Result<(), EngineError> {
        let Some(&index) = self.selected_glyphs().first() else {
            return Err(EngineError::failed(
                FailureKind::Lookup,
                "nothing selected to copy",
            ));
        };

        self.clipboard = Some(self.glyphs[index].name.clone());
        Ok(())
    }

    fn paste(&mut self) -> Result<(), EngineError> {
        let Some(reference) = self.clipboard.clone() else {
            return Err(EngineError::failed(FailureKind::Other, "clipboard is empty"));
        };

        for selector in self.selection.clone() {
            let outline = Outline::Reference(reference.clone());
            match self.position(&selector) {
                Some(index) => self.glyphs[index].outline = outline,
                None => self.push_glyph(Glyph::from_selector(&selector, outline)),
            }
        }

        Ok(())
    }

    fn generate(&mut self, path: &Path, format: OutputFormat) -> Result<(), EngineError> {
        debug!(path = %path.display(), format = format.as_str(), "recording generated font");
        self.outputs.push(path.to_path_buf());
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), EngineError> {
        debug!(path = %path.display(), "recording font source");
        self.outputs.push(path.to_path_buf());
        Ok(())
    }
}

/// A bitmap strike imported from a BDF file.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Strike {
    /// The BDF file the strike was read from.
    pub path: PathBuf,
    /// The pixel size of the strike.
    pub pixel_size: u32,
    /// The number of glyphs in the strike.
    pub glyph_count: usize,
}

impl Strike {
    /// Describes the strike stored in `bdf`, read from `path`.
    fn from_bdf(path: &Path, bdf: &bdf::Font) -> Self {
        let pixel_size = match bdf.properties().get("PIXEL_SIZE") {
            Some(bdf::Property::Integer(size)) => u32::try_from(*size).ok(),
            _ => None,
        };
        let pixel_size = pixel_size.unwrap_or_else(|| {
            bdf.glyphs()
                .values()
                .map(|glyph| glyph.height())
                .max()
                .unwrap_or(0)
        });

        Self {
            path: path.to_path_buf(),
            pixel_size,
            glyph_count: bdf.glyphs().len(),
        }
    }
}

/// A glyph slot of a [`MemoryFont`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Glyph {
    /// The glyph name.
    pub name: String,
    /// The code point the glyph is encoded at, if any.
    pub code_point: Option<u32>,
    /// Whether any strike carries a non-empty bitmap for the glyph.
    pub has_bitmap: bool,
    /// The glyph's outline.
    pub outline: Outline,
}

impl Glyph {
    /// Creates an unencoded or encoded glyph slot for `selector`.
    fn from_selector(selector: &GlyphSelector, outline: Outline) -> Self {
        let (name, code_point) = match selector {
            GlyphSelector::CodePoint(code_point) => {
                (format!("uni{code_point:04X}"), Some(*code_point))
            }
            GlyphSelector::Name(name) => (name.clone(), None),
        };

        Self {
            name,
            code_point,
            has_bitmap: false,
            outline,
        }
    }

    /// Returns the preferred selector for the glyph.
    fn selector(&self) -> GlyphSelector {
        match self.code_point {
            Some(code_point) => GlyphSelector::CodePoint(code_point),
            None => GlyphSelector::Name(self.name.clone()),
        }
    }

    /// Returns `true` if `selector` addresses this glyph.
    fn matches(&self, selector: &GlyphSelector) -> bool {
        match selector {
            GlyphSelector::CodePoint(code_point) => self.code_point == Some(*code_point),
            GlyphSelector::Name(name) => self.name == *name,
        }
    }
}

/// The outline state of a [`Glyph`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Outline {
    /// No outline has been produced.
    Empty,
    /// The outline was traced from the glyph's bitmap.
    Traced {
        /// Whether extrema points have been added.
        extrema: bool,
        /// Whether the outline has been simplified.
        simplified: bool,
    },
    /// The outline is a reference to the named glyph.
    Reference(String),
}

/// Reads the BDF file at `path`.
fn read_bdf(path: &Path) -> Result<bdf::Font, EngineError> {
    let file = File::open(path)?;
    Ok(bdf::read(file)?)
}

/// Returns the property `name` of `bdf` as a string.
fn string_property(bdf: &bdf::Font, name: &str) -> Option<String> {
    match bdf.properties().get(name)? {
        bdf::Property::String(value) => Some(value.clone()),
        bdf::Property::Integer(value) => Some(value.to_string()),
    }
}

/// Returns `true` if any pixel of `glyph` is set.
fn has_pixels(glyph: &bdf::Glyph) -> bool {
    (0..glyph.height()).any(|y| (0..glyph.width()).any(|x| glyph.get(x, y)))
}
