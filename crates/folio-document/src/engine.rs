// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Byte-buffer facade over the engine: every call parses its inputs, runs one
// operation and encodes the result with the configured compression.

use std::collections::BTreeSet;

use folio_core::error::{FolioError, Result};
use folio_core::{
    CompressionLevel, EncodeOptions, EngineConfig, Metadata, OpContext, PageDimensions, PaperSize,
    ParseMode,
};
use tracing::{debug, instrument};

use crate::model::Document;
use crate::ops::{self, placeholders};
use crate::overlay::{Anchor, OverlayCompositor, OverlaySet};
use crate::pdf::images::ImageConverter;
use crate::pdf::reader::parse;
use crate::pdf::writer::encode;

/// The PDF engine as seen by callers holding byte buffers.
#[derive(Debug, Clone, Default)]
pub struct PdfEngine {
    config: EngineConfig,
}

impl PdfEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>> {
        encode(document, &self.config.encode)
    }

    fn compositor(&self) -> OverlayCompositor<'_> {
        OverlayCompositor::new(&self.config)
    }

    // -- Page tree ------------------------------------------------------------

    /// Merge `inputs` in order. A parse failure names the 1-based input.
    #[instrument(skip_all, fields(inputs = inputs.len()))]
    pub fn merge(&self, inputs: &[&[u8]], ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let documents = inputs
            .iter()
            .enumerate()
            .map(|(index, bytes)| {
                parse(bytes, ParseMode::Import).map_err(|err| match err {
                    FolioError::Parse(msg) => FolioError::Parse(format!("input {}: {msg}", index + 1)),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.encode(&ops::merge(&documents, ctx)?)
    }

    pub fn split(&self, bytes: &[u8], start: u32, end: u32, ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::split(&source, start, end, ctx)?)
    }

    /// One encoded single-page PDF per in-range page number.
    pub fn split_to_files(
        &self,
        bytes: &[u8],
        numbers: &[u32],
        ctx: &OpContext<'_>,
    ) -> Result<Vec<Vec<u8>>> {
        let source = parse(bytes, ParseMode::Import)?;
        ops::split_to_separate_files(&source, numbers, ctx)?
            .iter()
            .map(|doc| self.encode(doc))
            .collect()
    }

    pub fn extract_pages(&self, bytes: &[u8], numbers: &[u32], ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::extract_pages(&source, numbers, ctx)?)
    }

    pub fn delete_pages(
        &self,
        bytes: &[u8],
        numbers: &BTreeSet<u32>,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::delete_pages(&source, numbers, ctx)?)
    }

    pub fn reorder_pages(&self, bytes: &[u8], order: &[u32], ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::reorder_pages(&source, order, ctx)?)
    }

    pub fn rotate(
        &self,
        bytes: &[u8],
        degrees: i32,
        numbers: Option<&BTreeSet<u32>>,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&ops::rotate_pages(&source, degrees, numbers, ctx)?)
    }

    pub fn reverse(&self, bytes: &[u8], ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::reverse_pages(&source, ctx)?)
    }

    pub fn add_blank_page(
        &self,
        bytes: &[u8],
        position: u32,
        width: f32,
        height: f32,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&ops::add_blank_page(&source, position, width, height, ctx)?)
    }

    /// A new one-page document of `paper` size with no content.
    pub fn blank_document(&self, paper: PaperSize) -> Result<Vec<u8>> {
        let (width, height) = paper.dimensions_pt();
        let mut document = Document::with_version(&self.config.pdf_version);
        let page_id = document.new_blank_page(width, height);
        document.push_page(page_id)?;
        self.encode(&document)
    }

    pub fn remove_annotations(&self, bytes: &[u8], ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&ops::remove_annotations(&source, ctx)?)
    }

    // -- Inspection and metadata ----------------------------------------------

    pub fn page_count(&self, bytes: &[u8]) -> Result<usize> {
        Ok(parse(bytes, ParseMode::ReadOnly)?.page_count())
    }

    pub fn page_dimensions(&self, bytes: &[u8]) -> Result<Vec<PageDimensions>> {
        Ok(parse(bytes, ParseMode::ReadOnly)?.page_dimensions())
    }

    pub fn metadata(&self, bytes: &[u8]) -> Result<Metadata> {
        Ok(parse(bytes, ParseMode::ReadOnly)?.metadata())
    }

    /// Overwrite the fields that are `Some` in `partial`.
    pub fn set_metadata(&self, bytes: &[u8], partial: &Metadata) -> Result<Vec<u8>> {
        let mut document = parse(bytes, ParseMode::Modify)?;
        document.set_metadata(partial)?;
        self.encode(&document)
    }

    pub fn remove_metadata(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut document = parse(bytes, ParseMode::Modify)?;
        document.remove_metadata()?;
        self.encode(&document)
    }

    // -- Overlays -------------------------------------------------------------

    pub fn add_watermark(
        &self,
        bytes: &[u8],
        text: &str,
        opacity: f32,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&self.compositor().add_watermark(&source, text, opacity, ctx)?)
    }

    pub fn add_page_numbers(
        &self,
        bytes: &[u8],
        position: Anchor,
        template: &str,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&self.compositor().add_page_numbers(&source, position, template, ctx)?)
    }

    pub fn set_background_color(&self, bytes: &[u8], hex: &str, ctx: &OpContext<'_>) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&self.compositor().set_background_color(&source, hex, ctx)?)
    }

    /// Burn `overlays` into the document. With nothing to burn, the input
    /// bytes come back as they are.
    #[instrument(skip_all, fields(bytes_len = bytes.len(), items = overlays.len()))]
    pub fn flatten_overlays(
        &self,
        bytes: &[u8],
        overlays: &OverlaySet,
        ctx: &OpContext<'_>,
    ) -> Result<Vec<u8>> {
        if overlays.is_empty() {
            debug!("No overlays, returning input unchanged");
            if let Some(sink) = ctx.progress {
                sink.report(100);
            }
            return Ok(bytes.to_vec());
        }
        let source = parse(bytes, ParseMode::Modify)?;
        self.encode(&self.compositor().flatten_overlays(&source, overlays, ctx)?)
    }

    // -- Serialisation --------------------------------------------------------

    /// Re-encode with an explicit compression level.
    pub fn compress(&self, bytes: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        let document = parse(bytes, ParseMode::Modify)?;
        let options = EncodeOptions {
            compression: level,
            ..self.config.encode
        };
        encode(&document, &options)
    }

    /// One page per image, on `paper`-sized pages.
    pub fn images_to_pdf(&self, images: &[&[u8]], paper: PaperSize) -> Result<Vec<u8>> {
        let generated = ImageConverter::new(paper).images_to_pdf(images)?;
        let document = parse(&generated, ParseMode::Modify)?;
        self.encode(&document)
    }

    // -- Not yet available ----------------------------------------------------

    pub fn convert_to_grayscale(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&placeholders::convert_to_grayscale(&source)?)
    }

    pub fn invert_colors(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&placeholders::invert_colors(&source)?)
    }

    pub fn remove_blank_pages(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let source = parse(bytes, ParseMode::Import)?;
        self.encode(&placeholders::remove_blank_pages(&source)?)
    }
}
