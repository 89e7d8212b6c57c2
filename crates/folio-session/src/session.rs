// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editing session — one open document plus the overlays drawn on it but not
// yet burned in.

use std::path::{Path, PathBuf};

use folio_core::OpContext;
use folio_core::error::{FolioError, Result};
use folio_document::{OverlayItem, OverlaySet, OverlayTarget, PdfEngine};
use tracing::{info, instrument};

use crate::render::RenderSource;

/// The document being edited and its pending overlays.
///
/// Overlays live here, keyed by page index, until [`EditingSession::flatten`]
/// (or a save) burns them into the bytes.
#[derive(Debug, Clone)]
pub struct EditingSession {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    page_count: usize,
    overlays: OverlaySet,
}

impl EditingSession {
    /// Start a session on PDF bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>, engine: &PdfEngine) -> Result<Self> {
        let page_count = engine.page_count(&bytes)?;
        Ok(Self {
            path: None,
            bytes,
            page_count,
            overlays: OverlaySet::new(),
        })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, engine: &PdfEngine) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut session = Self::from_bytes(bytes, engine)?;
        session.path = Some(path.to_path_buf());
        info!(pages = session.page_count, "session opened");
        Ok(session)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn has_pending_overlays(&self) -> bool {
        !self.overlays.is_empty()
    }

    /// Queue an overlay. Page targets must name an existing page (0-based).
    pub fn add_overlay(&mut self, target: OverlayTarget, item: OverlayItem) -> Result<()> {
        if let OverlayTarget::Page(index) = target {
            if index >= self.page_count {
                return Err(FolioError::invalid(format!(
                    "page index {index} is out of range for {} pages",
                    self.page_count
                )));
            }
        }
        self.overlays.add(target, item);
        Ok(())
    }

    pub fn clear_page_overlays(&mut self, index: usize) {
        self.overlays.clear_page(index);
    }

    /// Burn pending overlays into the document.
    pub fn flatten(&mut self, engine: &PdfEngine, ctx: &OpContext<'_>) -> Result<()> {
        if self.overlays.is_empty() {
            return Ok(());
        }
        self.bytes = engine.flatten_overlays(&self.bytes, &self.overlays, ctx)?;
        self.overlays.clear();
        Ok(())
    }

    /// Run a page-tree or document operation on the current bytes.
    ///
    /// Pending overlays are flattened first, since the operation may move or
    /// remove the pages they refer to.
    pub fn apply<F>(&mut self, engine: &PdfEngine, operation: F) -> Result<()>
    where
        F: FnOnce(&PdfEngine, &[u8]) -> Result<Vec<u8>>,
    {
        self.flatten(engine, &OpContext::default())?;
        let updated = operation(engine, &self.bytes)?;
        self.page_count = engine.page_count(&updated)?;
        self.bytes = updated;
        Ok(())
    }

    /// Flatten and write to `path`, which becomes the session's path.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn save_as(&mut self, engine: &PdfEngine, path: &Path, ctx: &OpContext<'_>) -> Result<()> {
        self.flatten(engine, ctx)?;
        std::fs::write(path, &self.bytes)?;
        self.path = Some(path.to_path_buf());
        info!(bytes = self.bytes.len(), "session saved");
        Ok(())
    }
}

impl RenderSource for EditingSession {
    fn renderable_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
