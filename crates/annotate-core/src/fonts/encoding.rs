//! WinAnsi text encoding for overlay strings

/// Code points 0x80-0x9F in WinAnsiEncoding; `None` marks unused slots.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Encode text for a simple font using WinAnsiEncoding.
///
/// Tabs become spaces; anything WinAnsi cannot represent becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(ch: char) -> u8 {
    match ch {
        '\t' => b' ',
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|c| *c == Some(ch))
            .map(|idx| 0x80 + idx as u8)
            .unwrap_or(b'?'),
    }
}

/// The character a WinAnsi code renders, if any
pub fn decode_win_ansi(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E => Some(code as char),
        0x80..=0x9F => WIN_ANSI_HIGH[(code - 0x80) as usize],
        0xA0..=0xFF => char::from_u32(code as u32),
        _ => None,
    }
}
