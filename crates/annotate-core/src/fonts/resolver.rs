//! Map a requested family and style onto a drawable font

use super::{FontRef, FontRegistry, ResolvedFont, StandardFont};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontClass {
    SansSerif,
    Serif,
    Monospace,
}

const SANS_FAMILIES: &[&str] = &[
    "arial",
    "helvetica",
    "verdana",
    "tahoma",
    "geneva",
    "calibri",
    "candara",
    "trebuchet ms",
    "century gothic",
    "franklin gothic medium",
    "comic sans ms",
    "arial black",
    "impact",
    "brush script mt",
    "lucida handwriting",
    "segoe script",
    "monotype corsiva",
    "sans-serif",
    "cursive",
    "fantasy",
];

const SERIF_FAMILIES: &[&str] = &[
    "times new roman",
    "times",
    "georgia",
    "garamond",
    "palatino",
    "book antiqua",
    "cambria",
    "papyrus",
    "copperplate",
    "serif",
];

const MONOSPACE_FAMILIES: &[&str] = &["courier new", "courier", "consolas", "monaco", "monospace"];

/// Handwriting families, always drawn italic
const SCRIPT_FAMILIES: &[&str] = &[
    "brush script mt",
    "lucida handwriting",
    "segoe script",
    "monotype corsiva",
];

/// Heavy display families, always drawn bold
const HEAVY_FAMILIES: &[&str] = &["impact", "arial black"];

impl FontClass {
    /// Unknown families are sans-serif
    pub fn for_family(family: &str) -> Self {
        let key = family.trim().to_lowercase();
        if SERIF_FAMILIES.contains(&key.as_str()) {
            FontClass::Serif
        } else if MONOSPACE_FAMILIES.contains(&key.as_str()) {
            FontClass::Monospace
        } else {
            if !SANS_FAMILIES.contains(&key.as_str()) {
                tracing::debug!("Unknown font family '{}', using sans-serif", family);
            }
            FontClass::SansSerif
        }
    }

    pub fn variant(&self, bold: bool, italic: bool) -> StandardFont {
        use StandardFont::*;
        match (self, bold, italic) {
            (FontClass::SansSerif, false, false) => Helvetica,
            (FontClass::SansSerif, true, false) => HelveticaBold,
            (FontClass::SansSerif, false, true) => HelveticaOblique,
            (FontClass::SansSerif, true, true) => HelveticaBoldOblique,
            (FontClass::Serif, false, false) => TimesRoman,
            (FontClass::Serif, true, false) => TimesBold,
            (FontClass::Serif, false, true) => TimesItalic,
            (FontClass::Serif, true, true) => TimesBoldItalic,
            (FontClass::Monospace, false, false) => Courier,
            (FontClass::Monospace, true, false) => CourierBold,
            (FontClass::Monospace, false, true) => CourierOblique,
            (FontClass::Monospace, true, true) => CourierBoldOblique,
        }
    }
}

/// Resolve a family and style request. Never fails.
///
/// A registered face wins when the family has one. Otherwise the family is
/// mapped to a built-in class, with script families forced italic and heavy
/// display families forced bold.
pub fn resolve_font(
    registry: &FontRegistry,
    family: &str,
    bold: bool,
    italic: bool,
) -> ResolvedFont {
    if let Some(face) = registry.find(family, bold, italic) {
        tracing::debug!(
            "Using registered font {} for '{}'",
            face.display_name(),
            family
        );
        return ResolvedFont {
            font: FontRef::Registered(face),
            bold,
            italic,
        };
    }

    let key = family.trim().to_lowercase();
    let italic = italic || SCRIPT_FAMILIES.contains(&key.as_str());
    let bold = bold || HEAVY_FAMILIES.contains(&key.as_str());
    let font = FontClass::for_family(&key).variant(bold, italic);
    tracing::debug!("Using built-in font {} for '{}'", font.base_font(), family);

    ResolvedFont {
        font: FontRef::Standard(font),
        bold,
        italic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontStyle;
    use proptest::prelude::*;

    fn standard(resolved: &ResolvedFont) -> StandardFont {
        match resolved.font {
            FontRef::Standard(font) => font,
            FontRef::Registered(_) => panic!("expected a built-in font"),
        }
    }

    #[test]
    fn test_family_classes() {
        let registry = FontRegistry::new();
        let cases = [
            ("Arial", "Helvetica"),
            ("Times New Roman", "Times-Roman"),
            ("georgia", "Times-Roman"),
            ("Courier New", "Courier"),
            ("Consolas", "Courier"),
            ("monospace", "Courier"),
            ("serif", "Times-Roman"),
            ("Wingdings", "Helvetica"),
            ("", "Helvetica"),
        ];
        for (family, expected) in cases {
            let resolved = resolve_font(&registry, family, false, false);
            assert_eq!(standard(&resolved).base_font(), expected, "family {}", family);
        }
    }

    #[test]
    fn test_style_variants() {
        let registry = FontRegistry::new();
        let font = |family: &str, bold: bool, italic: bool| {
            standard(&resolve_font(&registry, family, bold, italic))
        };
        assert_eq!(font("Georgia", true, false), StandardFont::TimesBold);
        assert_eq!(font("Georgia", false, true), StandardFont::TimesItalic);
        assert_eq!(font("Georgia", true, true), StandardFont::TimesBoldItalic);
        assert_eq!(font("Arial", true, true), StandardFont::HelveticaBoldOblique);
        assert_eq!(font("Courier New", false, true), StandardFont::CourierOblique);
    }

    #[test]
    fn test_script_families_force_italic() {
        let registry = FontRegistry::new();
        let resolved = resolve_font(&registry, "Brush Script MT", false, false);
        assert!(resolved.italic);
        assert!(!resolved.bold);
        assert_eq!(standard(&resolved), StandardFont::HelveticaOblique);

        let resolved = resolve_font(&registry, "Lucida Handwriting", true, false);
        assert_eq!(standard(&resolved), StandardFont::HelveticaBoldOblique);
    }

    #[test]
    fn test_heavy_families_force_bold() {
        let registry = FontRegistry::new();
        let resolved = resolve_font(&registry, "Impact", false, false);
        assert!(resolved.bold);
        assert_eq!(standard(&resolved), StandardFont::HelveticaBold);

        let resolved = resolve_font(&registry, "Arial Black", false, true);
        assert_eq!(standard(&resolved), StandardFont::HelveticaBoldOblique);
    }

    #[test]
    fn test_registered_family_wins_without_overrides() {
        let mut registry = FontRegistry::new();
        registry.register("Impact", FontStyle::REGULAR, vec![0u8], "memory");
        let resolved = resolve_font(&registry, "impact", false, false);
        assert!(matches!(resolved.font, FontRef::Registered(_)));
        assert!(!resolved.bold);
    }

    proptest! {
        #[test]
        fn resolution_always_yields_a_font(
            registered in any::<bool>(),
            family in prop_oneof![
                Just("Caveat".to_string()),
                Just("Arial".to_string()),
                Just("Brush Script MT".to_string()),
                "[A-Za-z][A-Za-z ]{0,19}",
            ],
            bold in any::<bool>(),
            italic in any::<bool>(),
        ) {
            let mut registry = FontRegistry::new();
            if registered {
                registry.register(&family, FontStyle::new(!bold, italic), vec![0u8], "memory");
            }
            let resolved = resolve_font(&registry, &family, bold, italic);
            prop_assert!(!resolved.font.name().is_empty());
            prop_assert!(resolved.bold || !bold);
            prop_assert!(resolved.italic || !italic);
        }
    }
}
