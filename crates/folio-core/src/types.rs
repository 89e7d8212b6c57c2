// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio PDF engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Document-level information dictionary fields.
///
/// Every field is independently optional. When used as a *partial* update
/// (see `Document::set_metadata`), `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub modification_date: Option<DateTime<FixedOffset>>,
}

impl Metadata {
    /// The "removed" record: every text field present but empty, no dates.
    pub fn cleared() -> Self {
        Self {
            title: Some(String::new()),
            author: Some(String::new()),
            subject: Some(String::new()),
            keywords: Some(String::new()),
            creator: Some(String::new()),
            producer: Some(String::new()),
            creation_date: None,
            modification_date: None,
        }
    }
}

/// How a PDF byte stream is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// Pages will be copied into a *different* output document.
    Import,
    /// The same document is edited in place and written back.
    Modify,
    /// Inspection only (metadata, dimensions); no write path follows.
    ReadOnly,
}

impl ParseMode {
    /// Whether a document opened in this mode may be mutated and encoded.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Modify)
    }
}

/// Stream compression applied when encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionLevel {
    /// Streams are written exactly as they are held in memory.
    None,
    /// Deflate at the fastest level.
    #[default]
    Fast,
    /// Deflate at the smallest-output level.
    Best,
}

/// Options for the encode side of the serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    pub compression: CompressionLevel,
    /// Keep image streams raw when deflate does not make them smaller.
    pub auto_detect_compressed_images: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Fast,
            auto_detect_compressed_images: true,
        }
    }
}

/// Page orientation as displayed (after applying `/Rotate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Inspection record returned by "get page dimensions".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    /// 1-based page number.
    pub page_number: u32,
    /// Width in PDF points (1/72 inch), from the effective MediaBox.
    pub width: f32,
    /// Height in PDF points.
    pub height: f32,
    pub orientation: Orientation,
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height), rounded to whole points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w as f32).round(), mm_to_pt(h as f32).round())
    }
}

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// An opaque sRGB colour, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    /// Grey level in `0.0..=1.0`.
    pub fn gray(level: f32) -> Self {
        let v = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(v, v, v)
    }

    /// Components scaled to the PDF `0.0..=1.0` range.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl FromStr for Rgb {
    type Err = FolioError;

    /// Accepts exactly `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FolioError::invalid(format!("colour must look like #RRGGBB, got {s:?}"));

        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if s.len() != 7 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
