// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — The Folio PDF engine.
//
// Provides the in-memory document model, the parse/encode boundary over
// `lopdf`, page-tree operations (merge, split, extract, delete, reorder,
// rotate, reverse, blank pages), the overlay compositor (watermarks, page
// numbers, background fills, flattened ink/image layers), image-to-PDF
// conversion, and the byte-buffer `PdfEngine` facade used by callers.

pub mod engine;
pub mod model;
pub mod ops;
pub mod overlay;
pub mod pdf;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the primary types so callers can use `folio_document::Document` etc.
pub use engine::PdfEngine;
pub use model::{Document, Page};
pub use overlay::{
    Anchor, CanvasSize, OverlayCompositor, OverlayItem, OverlaySet, OverlayTarget, StandardFont,
    TextPosition,
};
pub use pdf::reader::parse;
pub use pdf::writer::encode;
