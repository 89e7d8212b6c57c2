// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph metrics and single-byte encoding for the standard fonts.

use super::StandardFont;

/// Helvetica advance widths (1/1000 em) for bytes 32..=126.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

/// Width used for Latin-1 supplement glyphs outside the table.
const HELVETICA_FALLBACK: u16 = 556;

/// The WinAnsi 0x80..=0x9F block: character, code, Helvetica width.
#[rustfmt::skip]
const WIN_ANSI_EXTRA: [(char, u8, u16); 27] = [
    ('\u{20AC}', 0x80, 556),  // euro
    ('\u{201A}', 0x82, 222),  // single low quote
    ('\u{0192}', 0x83, 556),  // florin
    ('\u{201E}', 0x84, 333),  // double low quote
    ('\u{2026}', 0x85, 1000), // ellipsis
    ('\u{2020}', 0x86, 556),  // dagger
    ('\u{2021}', 0x87, 556),  // double dagger
    ('\u{02C6}', 0x88, 333),  // circumflex
    ('\u{2030}', 0x89, 1000), // per mille
    ('\u{0160}', 0x8A, 667),  // S caron
    ('\u{2039}', 0x8B, 333),  // single left guillemet
    ('\u{0152}', 0x8C, 1000), // OE
    ('\u{017D}', 0x8E, 611),  // Z caron
    ('\u{2018}', 0x91, 222),  // left single quote
    ('\u{2019}', 0x92, 222),  // right single quote
    ('\u{201C}', 0x93, 333),  // left double quote
    ('\u{201D}', 0x94, 333),  // right double quote
    ('\u{2022}', 0x95, 350),  // bullet
    ('\u{2013}', 0x96, 556),  // en dash
    ('\u{2014}', 0x97, 1000), // em dash
    ('\u{02DC}', 0x98, 333),  // small tilde
    ('\u{2122}', 0x99, 1000), // trademark
    ('\u{0161}', 0x9A, 500),  // s caron
    ('\u{203A}', 0x9B, 333),  // single right guillemet
    ('\u{0153}', 0x9C, 944),  // oe
    ('\u{017E}', 0x9E, 500),  // z caron
    ('\u{0178}', 0x9F, 667),  // Y diaeresis
];

const COURIER_WIDTH: u16 = 600;

/// Advance width of one encoded byte, in 1/1000 em.
fn glyph_width(font: StandardFont, byte: u8) -> u16 {
    match font {
        StandardFont::Courier => COURIER_WIDTH,
        StandardFont::Helvetica => match byte {
            32..=126 => HELVETICA_ASCII[(byte - 32) as usize],
            0x80..=0x9F => WIN_ANSI_EXTRA
                .iter()
                .find(|&&(_, code, _)| code == byte)
                .map_or(HELVETICA_FALLBACK, |&(_, _, width)| width),
            _ => HELVETICA_FALLBACK,
        },
    }
}

/// Width of `text` set in `font` at `size` points.
pub fn text_width(font: StandardFont, text: &str, size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|byte| glyph_width(font, byte) as u32)
        .sum();
    units as f32 * size / 1000.0
}

/// Encode for a `/WinAnsiEncoding` font. Characters without a slot become `?`.
///
/// Printable ASCII and Latin-1 map to themselves; typographic punctuation
/// and the few extra letters use the 0x80..=0x9F block.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => WIN_ANSI_EXTRA
                .iter()
                .find(|&&(extra, _, _)| extra == ch)
                .map_or(b'?', |&(_, code, _)| code),
        })
        .collect()
}
