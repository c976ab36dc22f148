//! Derivation of the OS/2 fsSelection and macStyle bits from the font weight.
//!
//! Newer FontForge releases no longer set these fields on their own, so they are ORed in
//! according to [`WEIGHT_STYLES`].

use engine::{Font, MetadataField, StyleBits};

use crate::error::ConvertError;

/// Maps lowercase weights to the bits to add to the fsSelection and macStyle fields.
///
/// See <https://learn.microsoft.com/typography/opentype/spec/os2#fsselection>.
pub const WEIGHT_STYLES: [(&str, StyleBits); 5] = [
    // fsSelection: REGULAR.
    ("normal", StyleBits::new(0x40, 0x0)),
    ("medium", StyleBits::new(0x40, 0x0)),
    // fsSelection: ITALIC and OBLIQUE. macStyle: italic.
    ("italic", StyleBits::new(0x201, 0x2)),
    // fsSelection: BOLD. macStyle: bold.
    ("bold", StyleBits::new(0x20, 0x1)),
    // fsSelection: ITALIC, OBLIQUE and BOLD. macStyle: bold and italic.
    ("bolditalic", StyleBits::new(0x221, 0x3)),
];

/// Returns the key under which `weight` is looked up in [`WEIGHT_STYLES`].
///
/// Fonts whose name ends in "italic" (in any case) are mapped from `medium` to `italic` and
/// from `bold` to `bolditalic`.
pub fn guess_weight(weight: &str, font_name: &str) -> String {
    let weight = weight.to_lowercase();
    let italic = font_name.to_lowercase().ends_with("italic");

    match weight.as_str() {
        "medium" if italic => "italic".to_owned(),
        "bold" if italic => "bolditalic".to_owned(),
        _ => weight,
    }
}

/// Returns the style bits defined for the lowercase `weight`.
pub fn style_bits(weight: &str) -> Option<StyleBits> {
    WEIGHT_STYLES
        .iter()
        .find(|(name, _)| *name == weight)
        .map(|(_, bits)| *bits)
}

/// ORs the style bits matching the font's weight into its OS/2 table, returning the bits that
/// were added.
///
/// # Errors
///
/// - [`ConvertError::StyleMapUnsupported`]: Returned if the engine has no style map field.
/// - [`ConvertError::UnknownWeight`]: Returned if no bits are defined for the guessed weight.
/// - [`ConvertError::Engine`]: Returned if reading or writing a field fails.
pub fn apply_style_tweaks<F: Font>(font: &mut F) -> Result<StyleBits, ConvertError> {
    if !font.has_style_map()? {
        return Err(ConvertError::StyleMapUnsupported);
    }

    let weight = font.metadata(MetadataField::Weight)?;
    let name = font.metadata(MetadataField::Name)?;
    let weight = guess_weight(&weight, &name);
    let Some(bits) = style_bits(&weight) else {
        return Err(ConvertError::UnknownWeight(weight));
    };

    println!(
        "OS/2 table tweaks: Guessed weight is `{weight}' -> Adding {:#x} to StyleMap and {:#x} \
         to macStyle.",
        bits.fs_selection, bits.mac_style
    );

    let current = font.style_bits()?;
    font.set_style_bits(current | bits)?;
    Ok(bits)
}

#[cfg(test)]
mod test {
    use engine::StyleBits;

    use crate::os2::{guess_weight, style_bits};

    #[test]
    fn weight_is_lowercased() {
        assert_eq!(guess_weight("Normal", "Terminus"), "normal");
        assert_eq!(guess_weight("BOLD", "Terminus"), "bold");
    }

    #[test]
    fn italic_suffix_changes_weight() {
        assert_eq!(guess_weight("Medium", "TerminusItalic"), "italic");
        assert_eq!(guess_weight("Bold", "Terminus-BoldITALIC"), "bolditalic");
        assert_eq!(guess_weight("Normal", "TerminusItalic"), "normal");
    }

    #[test]
    fn italic_must_be_a_suffix() {
        assert_eq!(guess_weight("Medium", "ItalicTerminus"), "medium");
    }

    #[test]
    fn known_weights() {
        assert_eq!(style_bits("normal"), Some(StyleBits::new(0x40, 0)));
        assert_eq!(style_bits("medium"), Some(StyleBits::new(0x40, 0)));
        assert_eq!(style_bits("italic"), Some(StyleBits::new(0x201, 0x2)));
        assert_eq!(style_bits("bold"), Some(StyleBits::new(0x20, 0x1)));
        assert_eq!(style_bits("bolditalic"), Some(StyleBits::new(0x221, 0x3)));
    }

    #[test]
    fn unknown_weight() {
        assert_eq!(style_bits("light"), None);
        assert_eq!(style_bits("Bold"), None);
    }

    #[test]
    fn tweaks_are_idempotent() {
        let existing = StyleBits::new(0x80, 0x0);
        let bits = style_bits("bolditalic").unwrap();

        let once = existing | bits;
        let twice = once | bits;
        assert_eq!(once, StyleBits::new(0x2A1, 0x3));
        assert_eq!(once, twice);
    }
}
