// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — turn a byte stream into a `Document` using the `lopdf` crate.

use std::path::Path;

use folio_core::ParseMode;
use folio_core::error::{FolioError, Result};
use lopdf::Document as RawDocument;
use tracing::{debug, info, instrument};

use crate::model::Document;

/// How far into the buffer the `%PDF-` marker may appear (some producers
/// prepend junk before the header).
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Parse PDF bytes into a [`Document`].
///
/// `mode` records the caller's intent. [`ParseMode::Import`] documents are
/// page sources for a different output document, [`ParseMode::Modify`]
/// documents are edited in place, and [`ParseMode::ReadOnly`] documents are
/// only inspected.
#[instrument(skip_all, fields(bytes_len = bytes.len(), mode = ?mode))]
pub fn parse(bytes: &[u8], mode: ParseMode) -> Result<Document> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if !window.windows(5).any(|w| w == b"%PDF-") {
        return Err(FolioError::Parse("missing %PDF- header".into()));
    }

    let raw = RawDocument::load_mem(bytes)
        .map_err(|err| FolioError::Parse(format!("failed to load PDF from memory: {err}")))?;

    if raw.is_encrypted() {
        return Err(FolioError::Parse(
            "encrypted documents are not supported".into(),
        ));
    }
    if let Err(err) = raw.catalog() {
        return Err(FolioError::Parse(format!("document has no catalog: {err}")));
    }

    let doc = Document::from_raw(raw, mode);
    // Resolving the root here turns a missing page tree into a parse error
    // instead of a failure halfway through an operation.
    doc.pages_root()
        .map_err(|err| FolioError::Parse(format!("document has no page tree: {err}")))?;

    debug!(pages = doc.page_count(), version = doc.version(), "PDF parsed");
    Ok(doc)
}

/// Read and parse a PDF from the filesystem.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>, mode: ParseMode) -> Result<Document> {
    let path_ref = path.as_ref();
    info!("Opening PDF: {}", path_ref.display());

    let bytes = std::fs::read(path_ref)?;
    parse(&bytes, mode).map_err(|err| match err {
        FolioError::Parse(detail) => {
            FolioError::Parse(format!("{}: {detail}", path_ref.display()))
        }
        other => other,
    })
}
