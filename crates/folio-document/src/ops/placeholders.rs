// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transforms that are offered by the tool registry but have no engine
// behind them yet. Each one fails loudly rather than returning its input.

use folio_core::error::{FolioError, Result};
use tracing::warn;

use crate::model::Document;

/// Recolour every page to shades of grey.
pub fn convert_to_grayscale(_document: &Document) -> Result<Document> {
    not_implemented("convert_to_grayscale")
}

/// Invert the colours of every page.
pub fn invert_colors(_document: &Document) -> Result<Document> {
    not_implemented("invert_colors")
}

/// Drop pages with no visible marks.
pub fn remove_blank_pages(_document: &Document) -> Result<Document> {
    not_implemented("remove_blank_pages")
}

fn not_implemented(operation: &'static str) -> Result<Document> {
    warn!(operation, "requested transform is not implemented");
    Err(FolioError::NotImplemented { operation })
}
