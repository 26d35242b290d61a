//! Font registration, resolution and embedding
//!
//! Registered TrueType faces are loaded once at startup into a
//! [`FontRegistry`] which is read-only afterwards. Requests that cannot be
//! served from the registry fall back to the PDF standard 14 fonts.

pub mod embed;
pub mod encoding;
pub mod metrics;
pub mod registry;
pub mod resolver;

use std::sync::Arc;

pub use embed::{DocumentFonts, PreparedFont};
pub use encoding::encode_win_ansi;
pub use metrics::GlyphWidths;
pub use registry::{FontFace, FontRegistry};
pub use resolver::{resolve_font, FontClass};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle::new(false, false);

    pub const fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }

    /// Infer the style from a font file name.
    ///
    /// Looks for a bold+italic marker first, then bold, then italic/oblique.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let bold = lower.contains("bold");
        let italic = lower.contains("italic") || lower.contains("oblique");
        FontStyle::new(bold, italic)
    }
}

/// The PDF standard 14 text fonts (Symbol and ZapfDingbats excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 12] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
    ];

    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn from_base_font(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|font| font.base_font() == name)
    }
}

/// A font the overlay can draw with
#[derive(Debug, Clone)]
pub enum FontRef {
    Standard(StandardFont),
    Registered(Arc<FontFace>),
}

impl FontRef {
    pub fn name(&self) -> String {
        match self {
            FontRef::Standard(font) => font.base_font().to_string(),
            FontRef::Registered(face) => face.display_name(),
        }
    }
}

/// Outcome of font resolution.
///
/// `bold`/`italic` are the effective flags after family overrides, so
/// width measurement uses the same style that is drawn.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub font: FontRef,
    pub bold: bool,
    pub italic: bool,
}
