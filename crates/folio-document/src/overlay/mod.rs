// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay compositor — stamps text, fills and rasters onto pages without
// touching the bytes of existing content streams.
//
// Overlays are transient. The editing session collects them in an
// [`OverlaySet`] and hands the set to [`OverlayCompositor::flatten_overlays`]
// when the document is saved.

mod compositor;
pub(crate) mod content;
pub mod metrics;
mod raster;

use std::collections::BTreeMap;

use folio_core::Rgb;
use image::RgbaImage;

pub use compositor::OverlayCompositor;

/// Size of the on-screen canvas an overlay was captured on, in pixels.
///
/// Raster and ink geometry is expressed in this space (origin top-left,
/// y down) and mapped onto the page at flatten time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// The nine places a short label can sit on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vertical {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    pub(crate) fn split(self) -> (Vertical, Horizontal) {
        use Horizontal::*;
        use Vertical::*;
        match self {
            Self::TopLeft => (Top, Left),
            Self::TopCenter => (Top, Center),
            Self::TopRight => (Top, Right),
            Self::MiddleLeft => (Middle, Left),
            Self::MiddleCenter => (Middle, Center),
            Self::MiddleRight => (Middle, Right),
            Self::BottomLeft => (Bottom, Left),
            Self::BottomCenter => (Bottom, Center),
            Self::BottomRight => (Bottom, Right),
        }
    }
}

/// Where a text stamp goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPosition {
    Anchored(Anchor),
    /// Centred on the page and rising at 45 degrees, watermark style.
    Diagonal,
}

/// The base-14 faces used for stamped text. Neither needs embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    Courier,
}

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }
}

/// One piece of content to composite onto a page.
#[derive(Debug, Clone)]
pub enum OverlayItem {
    /// Vector text drawn above the page content.
    TextStamp {
        text: String,
        position: TextPosition,
        font: StandardFont,
        size: f32,
        color: Rgb,
        opacity: f32,
    },
    /// Full-page fill drawn beneath the page content.
    SolidFill { color: Rgb },
    /// A picture placed on the canvas at `(x, y)` with the given size.
    RasterImage {
        image: RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        canvas: CanvasSize,
    },
    /// A freehand stroke through `points`.
    InkStroke {
        points: Vec<(f32, f32)>,
        thickness: f32,
        color: Rgb,
        canvas: CanvasSize,
    },
}

impl OverlayItem {
    /// Raster and ink items are burned into one image per page.
    pub(crate) fn is_raster(&self) -> bool {
        matches!(self, Self::RasterImage { .. } | Self::InkStroke { .. })
    }
}

/// Which page(s) an item applies to. Page indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    Page(usize),
    All,
}

/// Every overlay pending for one document, grouped by target.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    pages: BTreeMap<usize, Vec<OverlayItem>>,
    all_pages: Vec<OverlayItem>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: OverlayTarget, item: OverlayItem) {
        match target {
            OverlayTarget::Page(index) => self.pages.entry(index).or_default().push(item),
            OverlayTarget::All => self.all_pages.push(item),
        }
    }

    /// Items for page `index`: the all-pages items first, then the
    /// page-specific ones in insertion order.
    pub fn items_for(&self, index: usize) -> Vec<&OverlayItem> {
        self.all_pages
            .iter()
            .chain(self.pages.get(&index).into_iter().flatten())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.all_pages.is_empty() && self.pages.values().all(Vec::is_empty)
    }

    /// Drop the items of one page. All-pages items are unaffected.
    pub fn clear_page(&mut self, index: usize) {
        self.pages.remove(&index);
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.all_pages.clear();
    }

    /// Total number of stored items.
    pub fn len(&self) -> usize {
        self.all_pages.len() + self.pages.values().map(Vec::len).sum::<usize>()
    }
}
