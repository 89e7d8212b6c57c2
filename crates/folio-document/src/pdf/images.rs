// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-to-PDF conversion using `printpdf` 0.8.
//
// Each decoded image becomes one page of the chosen paper size, scaled down to
// fit inside the margins and centred.

use folio_core::PaperSize;
use folio_core::error::{FolioError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// Margin around each placed image.
const MARGIN_MM: f32 = 15.0;

/// Native resolution assumed for image pixels.
const IMAGE_DPI: f32 = 150.0;

const DOCUMENT_TITLE: &str = "Folio Images";

/// Builds PDF documents whose pages are raster images.
pub struct ImageConverter {
    paper_size: PaperSize,
}

impl ImageConverter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Encode `images` (PNG, JPEG, ... anything `image` can sniff) as one
    /// page each, in order.
    #[instrument(skip_all, fields(images = images.len(), paper = ?self.paper_size))]
    pub fn images_to_pdf(&self, images: &[&[u8]]) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(FolioError::invalid("no images to convert"));
        }

        let (page_w, page_h) = self.page_dimensions();
        let mut doc = PdfDocument::new(DOCUMENT_TITLE);
        let mut pages = Vec::with_capacity(images.len());

        for (index, bytes) in images.iter().enumerate() {
            let decoded = ::image::load_from_memory(bytes).map_err(|err| {
                FolioError::Image(format!("failed to decode image {}: {err}", index + 1))
            })?;

            let width = decoded.width() as usize;
            let height = decoded.height() as usize;
            let raw = RawImage {
                pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
                width,
                height,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let placement = fit_to_page(page_w, page_h, width, height);
            debug!(
                image = index + 1,
                width,
                height,
                scale = placement.scale,
                "Image placed on page"
            );

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(placement.x)),
                    translate_y: Some(Pt(placement.y)),
                    scale_x: Some(placement.scale),
                    scale_y: Some(placement.scale),
                    dpi: Some(IMAGE_DPI),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        info!(bytes = output.len(), warnings = warnings.len(), "Image PDF created");
        Ok(output)
    }
}

/// Where and how large one image lands on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    x: f32,
    y: f32,
    scale: f32,
}

/// Scale to fit inside the margins without upscaling, then centre.
fn fit_to_page(page_w: Mm, page_h: Mm, width: usize, height: usize) -> Placement {
    let margin_pt = Mm(MARGIN_MM).into_pt().0;
    let usable_w = Mm(page_w.0 - 2.0 * MARGIN_MM).into_pt().0;
    let usable_h = Mm(page_h.0 - 2.0 * MARGIN_MM).into_pt().0;

    let img_w = (width.max(1) as f32) / IMAGE_DPI * 72.0;
    let img_h = (height.max(1) as f32) / IMAGE_DPI * 72.0;
    let scale = (usable_w / img_w).min(usable_h / img_h).min(1.0);

    Placement {
        x: margin_pt + (usable_w - img_w * scale) / 2.0,
        y: margin_pt + (usable_h - img_h * scale) / 2.0,
        scale,
    }
}
