//! Glyph advance widths for string-width measurement
//!
//! Widths are in 1/1000 em, indexed by WinAnsi code. Built-in fonts use the
//! standard AFM advances for printable ASCII; TrueType faces are measured
//! from their `hmtx` table.

use ttf_parser::Face;

use super::encoding::decode_win_ansi;
use super::StandardFont;

pub const FIRST_CHAR: u8 = 32;
pub const LAST_CHAR: u8 = 255;
const SLOTS: usize = (LAST_CHAR - FIRST_CHAR) as usize + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphWidths {
    widths: [u16; SLOTS],
}

impl GlyphWidths {
    fn uniform(width: u16) -> Self {
        Self {
            widths: [width; SLOTS],
        }
    }

    fn from_ascii(table: &[u16; 95], default_width: u16) -> Self {
        let mut metrics = Self::uniform(default_width);
        metrics.widths[..95].copy_from_slice(table);
        metrics
    }

    pub fn for_standard(font: StandardFont) -> Self {
        use StandardFont::*;
        match font {
            Helvetica | HelveticaOblique => Self::from_ascii(&HELVETICA, 556),
            HelveticaBold | HelveticaBoldOblique => Self::from_ascii(&HELVETICA_BOLD, 611),
            TimesRoman | TimesBold | TimesItalic | TimesBoldItalic => {
                Self::from_ascii(&TIMES_ROMAN, 500)
            }
            Courier | CourierBold | CourierOblique | CourierBoldOblique => Self::uniform(600),
        }
    }

    /// Measure every WinAnsi slot the face has a glyph for
    pub fn from_face(face: &Face<'_>) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        let missing = face
            .glyph_index(' ')
            .and_then(|id| face.glyph_hor_advance(id))
            .unwrap_or(0);

        let mut widths = [0u16; SLOTS];
        for (slot, width) in widths.iter_mut().enumerate() {
            let code = FIRST_CHAR + slot as u8;
            let advance = decode_win_ansi(code)
                .and_then(|ch| face.glyph_index(ch))
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(missing);
            *width = ((advance as f32 / units_per_em) * 1000.0).round() as u16;
        }
        Self { widths }
    }

    pub fn width(&self, code: u8) -> u16 {
        if code < FIRST_CHAR {
            return 0;
        }
        self.widths[(code - FIRST_CHAR) as usize]
    }

    /// Width of WinAnsi-encoded text at the given font size
    pub fn measure(&self, encoded: &[u8], font_size: f64) -> f64 {
        let units: u32 = encoded.iter().map(|&code| self.width(code) as u32).sum();
        units as f64 * font_size / 1000.0
    }

    /// The `/Widths` array for a simple font spanning FIRST_CHAR..=LAST_CHAR
    pub fn as_slice(&self) -> &[u16] {
        &self.widths
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];
