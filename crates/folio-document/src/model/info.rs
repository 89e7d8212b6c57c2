// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Information dictionary codec: PDF text strings and PDF date strings.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lopdf::{Object, StringFormat};

/// Info dictionary keys for the text fields, in `Metadata` field order.
pub(crate) const TEXT_KEYS: [&[u8]; 6] = [
    b"Title",
    b"Author",
    b"Subject",
    b"Keywords",
    b"Creator",
    b"Producer",
];

pub(crate) const CREATION_DATE: &[u8] = b"CreationDate";
pub(crate) const MOD_DATE: &[u8] = b"ModDate";

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or
/// PDFDocEncoding, which we read as Latin-1).
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(body) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(body).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode a Rust string as a PDF text string object.
///
/// Pure ASCII is written as-is; anything else becomes UTF-16BE with a BOM.
pub(crate) fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Read a text value out of an info dictionary entry.
pub(crate) fn text_value(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`). Every component after the
/// year is optional; a missing offset is taken as UTC.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digit_len = s.bytes().take_while(u8::is_ascii_digit).count().min(14);
    if digit_len < 4 {
        return None;
    }
    let (digits, rest) = s.split_at(digit_len);

    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        if digits.len() >= start + len {
            digits[start..start + len].parse().ok()
        } else {
            Some(default)
        }
    };

    let year: i32 = digits[0..4].parse().ok()?;
    let month = field(4, 2, 1)?;
    let day = field(6, 2, 1)?;
    let hour = field(8, 2, 0)?;
    let minute = field(10, 2, 0)?;
    let second = field(12, 2, 0)?;

    let offset_seconds = parse_offset(rest)?;
    let offset = FixedOffset::east_opt(offset_seconds)?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    offset.from_local_datetime(&naive).single()
}

fn parse_offset(rest: &str) -> Option<i32> {
    let mut chars = rest.chars();
    let sign = match chars.next() {
        None | Some('Z') | Some('z') => return Some(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return Some(0),
    };
    let digits: String = chars.filter(char::is_ascii_digit).take(4).collect();
    let hours: i32 = digits.get(0..2).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Format a date the way PDF writers conventionally do.
pub fn format_pdf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        (offset % 3600) / 60
    )
}
