//! Fixes which make the generated font usable as an editor font in Visual Studio.
//!
//! Visual Studio only lists raster-derived fonts which claim support for the Traditional
//! Chinese code page and which contain a handful of Hiragana glyphs.

use engine::{Encoding, Font, GlyphSelector};

use crate::error::ConvertError;

/// Bit of the first OS/2 code page word which marks code page 950 (Traditional Chinese).
pub const CP950_BIT: i32 = 1 << 20;

/// Code points Visual Studio requires to be present.
pub const REQUIRED_CODE_POINTS: [u32; 6] = [0x3044, 0x3046, 0x304B, 0x3057, 0x306E, 0x3093];

/// Returns the glyphs tried, in order, as the substitute for missing required glyphs.
///
/// U+0000 is the default character, which is what should be shown for missing glyphs anyway.
pub fn substitution_candidates() -> [GlyphSelector; 3] {
    [
        GlyphSelector::CodePoint(0),
        GlyphSelector::Name("question".to_owned()),
        GlyphSelector::Name("space".to_owned()),
    ]
}

/// Applies the Visual Studio fixes to `font`, returning the name of the substitution glyph.
///
/// # Errors
///
/// - [`ConvertError::NoSubstitutionGlyph`]: Returned if no substitution candidate exists.
/// - [`ConvertError::Engine`]: Returned if any engine operation fails.
pub fn apply_visual_studio_fixes<F: Font>(font: &mut F) -> Result<String, ConvertError> {
    println!("Applying Visual Studio fixes...");

    font.set_encoding(Encoding::UnicodeBmp)?;

    let [low, high] = font.code_pages()?;
    font.set_code_pages([low | CP950_BIT, high])?;

    let mut substitute = None;
    for candidate in substitution_candidates() {
        if font.contains(&candidate)? {
            substitute = Some(candidate);
            break;
        }
    }
    let Some(substitute) = substitute else {
        return Err(ConvertError::NoSubstitutionGlyph);
    };

    let name = font.glyph_name(&substitute)?;
    println!("  Chose `{name}' as substitution glyph.");

    font.select(&substitute)?;
    font.copy_reference()?;

    for code_point in REQUIRED_CODE_POINTS {
        let selector = GlyphSelector::CodePoint(code_point);
        if !font.contains(&selector)? {
            font.select(&selector)?;
            font.paste()?;
        }
    }

    Ok(name)
}
