//! Color expression parsing
//!
//! Annotation colors arrive as loosely typed CSS-ish strings. Anything that
//! does not parse resolves to black so a bad value never aborts a page.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components in the 0-1 range used by PDF color operators
    pub fn to_pdf(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("red", Rgb::new(0xFF, 0x00, 0x00)),
    ("blue", Rgb::new(0x00, 0x00, 0xFF)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("white", Rgb::new(0xFF, 0xFF, 0xFF)),
    ("yellow", Rgb::new(0xFF, 0xFF, 0x00)),
    ("orange", Rgb::new(0xFF, 0xA5, 0x00)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("grey", Rgb::new(0x80, 0x80, 0x80)),
    ("brown", Rgb::new(0xA5, 0x2A, 0x2A)),
    ("pink", Rgb::new(0xFF, 0xC0, 0xCB)),
    ("cyan", Rgb::new(0x00, 0xFF, 0xFF)),
    ("magenta", Rgb::new(0xFF, 0x00, 0xFF)),
    ("lime", Rgb::new(0x00, 0xFF, 0x00)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("silver", Rgb::new(0xC0, 0xC0, 0xC0)),
];

/// Resolve a color expression: a named color, `#RRGGBB`, or `rgb(r, g, b)`.
///
/// Empty, unknown or malformed input yields black.
pub fn parse_color(input: Option<&str>) -> Rgb {
    let Some(raw) = input else {
        return Rgb::BLACK;
    };
    let color = raw.trim().to_lowercase();
    if color.is_empty() {
        return Rgb::BLACK;
    }

    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == color) {
        return *rgb;
    }

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(Rgb::BLACK);
    }

    if let Some(body) = color.strip_prefix("rgb(") {
        return parse_rgb_function(body).unwrap_or(Rgb::BLACK);
    }

    Rgb::BLACK
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

fn parse_rgb_function(body: &str) -> Option<Rgb> {
    let inner = body.strip_suffix(')')?;
    let components: Vec<&str> = inner.split(',').map(str::trim).collect();
    if components.len() != 3 {
        return None;
    }
    // u8 parsing rejects anything outside 0-255, including negatives
    let r = components[0].parse::<u8>().ok()?;
    let g = components[1].parse::<u8>().ok()?;
    let b = components[2].parse::<u8>().ok()?;
    Some(Rgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_named_colors_case_insensitive() {
        assert_eq!(parse_color(Some("red")), Rgb::new(255, 0, 0));
        assert_eq!(parse_color(Some("  RED ")), Rgb::new(255, 0, 0));
        assert_eq!(parse_color(Some("Navy")), Rgb::new(0, 0, 128));
        assert_eq!(parse_color(Some("grey")), parse_color(Some("gray")));
    }

    #[test]
    fn test_rgb_function_matches_named() {
        assert_eq!(parse_color(Some("rgb(255,0,0)")), parse_color(Some("red")));
        assert_eq!(
            parse_color(Some("rgb( 0 , 128 , 128 )")),
            parse_color(Some("teal"))
        );
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color(Some("#FF0000")), Rgb::new(255, 0, 0));
        assert_eq!(parse_color(Some("#00ff7f")), Rgb::new(0, 255, 127));
    }

    #[test]
    fn test_invalid_input_is_black() {
        assert_eq!(parse_color(Some("notacolor")), Rgb::BLACK);
        assert_eq!(parse_color(Some("#GG0000")), Rgb::BLACK);
        assert_eq!(parse_color(Some("#FFF")), Rgb::BLACK);
        assert_eq!(parse_color(Some("rgb(300,0,0)")), Rgb::BLACK);
        assert_eq!(parse_color(Some("rgb(-1,0,0)")), Rgb::BLACK);
        assert_eq!(parse_color(Some("rgb(1,2)")), Rgb::BLACK);
        assert_eq!(parse_color(Some("rgb(1,2,3")), Rgb::BLACK);
        assert_eq!(parse_color(Some("")), Rgb::BLACK);
        assert_eq!(parse_color(None), Rgb::BLACK);
    }

    #[test]
    fn test_to_pdf_range() {
        assert_eq!(Rgb::WHITE.to_pdf(), [1.0, 1.0, 1.0]);
        assert_eq!(Rgb::BLACK.to_pdf(), [0.0, 0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn rgb_function_roundtrips_components(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let expr = format!("rgb({}, {}, {})", r, g, b);
            prop_assert_eq!(parse_color(Some(&expr)), Rgb::new(r, g, b));
        }

        #[test]
        fn hex_matches_rgb_function(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let hex = format!("#{:02X}{:02X}{:02X}", r, g, b);
            let func = format!("rgb({},{},{})", r, g, b);
            prop_assert_eq!(parse_color(Some(&hex)), parse_color(Some(&func)));
        }

        #[test]
        fn arbitrary_input_never_panics(s in ".*") {
            let _ = parse_color(Some(&s));
        }
    }
}
