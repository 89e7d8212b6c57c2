// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay compositor — watermark, page numbers, background colour and the
// general flatten operation that burns an `OverlaySet` into the pages.

use std::collections::HashMap;
use std::fmt::Write;

use folio_core::error::{FolioError, Result};
use folio_core::{EngineConfig, OpContext, Rgb};
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, info, instrument};

use super::content::{append_content, prepend_content, register_resource};
use super::metrics::{encode_win_ansi, text_width};
use super::raster::{embed_layer, layer_size, paint_layer, unrotate};
use super::{Anchor, Horizontal, OverlayItem, OverlaySet, OverlayTarget, StandardFont, TextPosition, Vertical};
use crate::model::{Document, Page};

/// Cap height of the standard fonts as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.7;

/// Composites overlays onto copies of documents. Inputs are never modified.
pub struct OverlayCompositor<'c> {
    config: &'c EngineConfig,
}

impl<'c> OverlayCompositor<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Stamp `text` diagonally across the centre of every page.
    #[instrument(skip(self, document, ctx), fields(pages = document.page_count()))]
    pub fn add_watermark(
        &self,
        document: &Document,
        text: &str,
        opacity: f32,
        ctx: &OpContext<'_>,
    ) -> Result<Document> {
        if text.trim().is_empty() {
            return Err(FolioError::invalid("watermark text is empty"));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(FolioError::invalid(format!(
                "opacity must be between 0 and 1, got {opacity}"
            )));
        }

        let mut overlays = OverlaySet::new();
        overlays.add(
            OverlayTarget::All,
            OverlayItem::TextStamp {
                text: text.to_string(),
                position: TextPosition::Diagonal,
                font: StandardFont::Helvetica,
                size: self.config.watermark_font_size,
                color: Rgb::gray(self.config.watermark_gray),
                opacity,
            },
        );
        self.flatten_overlays(document, &overlays, ctx)
    }

    /// Number every page. `template` may use `{page}` and `{total}`.
    #[instrument(skip(self, document, ctx), fields(pages = document.page_count()))]
    pub fn add_page_numbers(
        &self,
        document: &Document,
        position: Anchor,
        template: &str,
        ctx: &OpContext<'_>,
    ) -> Result<Document> {
        if template.is_empty() {
            return Err(FolioError::invalid("page number template is empty"));
        }

        let total = document.page_count();
        let mut overlays = OverlaySet::new();
        for index in 0..total {
            let text = template
                .replace("{page}", &(index + 1).to_string())
                .replace("{total}", &total.to_string());
            overlays.add(
                OverlayTarget::Page(index),
                OverlayItem::TextStamp {
                    text,
                    position: TextPosition::Anchored(position),
                    font: StandardFont::Helvetica,
                    size: self.config.page_number_font_size,
                    color: Rgb::BLACK,
                    opacity: 1.0,
                },
            );
        }
        self.flatten_overlays(document, &overlays, ctx)
    }

    /// Fill every page with `hex` (`#RRGGBB`) beneath the existing content.
    #[instrument(skip(self, document, ctx), fields(pages = document.page_count()))]
    pub fn set_background_color(
        &self,
        document: &Document,
        hex: &str,
        ctx: &OpContext<'_>,
    ) -> Result<Document> {
        let color: Rgb = hex.parse()?;
        let mut overlays = OverlaySet::new();
        overlays.add(OverlayTarget::All, OverlayItem::SolidFill { color });
        self.flatten_overlays(document, &overlays, ctx)
    }

    /// Burn `overlays` into a copy of `document`.
    ///
    /// Per page: fills go beneath the existing content; text stamps and then
    /// the combined ink/image layer go on top. Pages without overlays are
    /// copied unchanged.
    #[instrument(skip_all, fields(pages = document.page_count(), items = overlays.len()))]
    pub fn flatten_overlays(
        &self,
        document: &Document,
        overlays: &OverlaySet,
        ctx: &OpContext<'_>,
    ) -> Result<Document> {
        let mut output = document.to_writable();
        let pages = output.pages();
        let mut tracker = ctx.tracker(pages.len());
        let mut shared = SharedResources::default();
        let mut stamped = 0usize;

        for (index, page) in pages.iter().enumerate() {
            tracker.checkpoint()?;
            let items = overlays.items_for(index);
            if !items.is_empty() {
                self.stamp_page(&mut output, page, &items, &mut shared)?;
                stamped += 1;
            }
            tracker.advance();
        }

        tracker.finish();
        info!(stamped, "Overlays flattened");
        Ok(output)
    }

    fn stamp_page(
        &self,
        doc: &mut Document,
        page: &Page,
        items: &[&OverlayItem],
        shared: &mut SharedResources,
    ) -> Result<()> {
        let page_id = page.content_ref;
        let (x0, y0) = page.origin;
        let mut names = HashMap::new();

        let mut underlay = String::new();
        for item in items {
            if let OverlayItem::SolidFill { color } = item {
                let [r, g, b] = color.to_unit();
                let _ = writeln!(
                    underlay,
                    "q {} {} {} rg {} {} {} {} re f Q",
                    num(r),
                    num(g),
                    num(b),
                    num(x0),
                    num(y0),
                    num(page.width),
                    num(page.height)
                );
            }
        }
        if !underlay.is_empty() {
            prepend_content(doc, page_id, underlay.trim_end().as_bytes())?;
        }

        let mut overlay = String::new();
        for item in items {
            if let OverlayItem::TextStamp {
                text,
                position,
                font,
                size,
                color,
                opacity,
            } = item
            {
                let font_id = shared.font(doc, *font);
                let font_name = page_resource(doc, page_id, &mut names, "Font", "FolioF", font_id)?;
                let opacity = opacity.clamp(0.0, 1.0);
                let state_name = if opacity < 1.0 {
                    let state_id = shared.opacity(doc, opacity);
                    Some(page_resource(doc, page_id, &mut names, "ExtGState", "FolioGS", state_id)?)
                } else {
                    None
                };
                let stamp = TextStampLayout {
                    text,
                    position: *position,
                    font: *font,
                    size: *size,
                    margin: self.config.page_number_margin,
                };
                write_text_stamp(&mut overlay, page, &stamp, &font_name, state_name.as_deref(), *color);
            }
        }

        let raster_items: Vec<&OverlayItem> = items.iter().copied().filter(|item| item.is_raster()).collect();
        if !raster_items.is_empty() {
            let (display_w, display_h) = page.displayed_size();
            let (layer_w, layer_h) = layer_size(display_w, display_h, self.config.overlay_raster_dpi);
            let layer = unrotate(paint_layer(&raster_items, layer_w, layer_h), page.rotation);
            let image_id = embed_layer(doc, &layer)?;
            let image_name = register_resource(doc, page_id, "XObject", "FolioIm", Object::Reference(image_id))?;
            let _ = writeln!(
                overlay,
                "q {} 0 0 {} {} {} cm /{image_name} Do Q",
                num(page.width),
                num(page.height),
                num(x0),
                num(y0)
            );
            debug!(page = page.number, layer_w, layer_h, items = raster_items.len(), "Raster layer placed");
        }

        if !overlay.is_empty() {
            append_content(doc, page_id, overlay.trim_end().as_bytes())?;
        }
        Ok(())
    }
}

/// Document-wide objects created once per call and shared by all pages.
#[derive(Default)]
struct SharedResources {
    fonts: HashMap<StandardFont, ObjectId>,
    states: HashMap<u32, ObjectId>,
}

impl SharedResources {
    fn font(&mut self, doc: &mut Document, font: StandardFont) -> ObjectId {
        *self.fonts.entry(font).or_insert_with(|| {
            doc.raw_mut().add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                ("BaseFont", Object::Name(font.base_font().as_bytes().to_vec())),
                ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
            ]))
        })
    }

    fn opacity(&mut self, doc: &mut Document, opacity: f32) -> ObjectId {
        *self.states.entry(opacity.to_bits()).or_insert_with(|| {
            doc.raw_mut().add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"ExtGState".to_vec())),
                ("ca", Object::Real(opacity)),
                ("CA", Object::Real(opacity)),
            ]))
        })
    }
}

/// Register `id` on the page once, reusing the name for later stamps.
fn page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    names: &mut HashMap<ObjectId, String>,
    category: &str,
    prefix: &str,
    id: ObjectId,
) -> Result<String> {
    if let Some(name) = names.get(&id) {
        return Ok(name.clone());
    }
    let name = register_resource(doc, page_id, category, prefix, Object::Reference(id))?;
    names.insert(id, name.clone());
    Ok(name)
}

struct TextStampLayout<'a> {
    text: &'a str,
    position: TextPosition,
    font: StandardFont,
    size: f32,
    margin: f32,
}

impl TextStampLayout<'_> {
    /// Text matrix `[a b c d e f]` in display space (origin bottom-left of
    /// the page as shown, rotation already applied).
    fn text_matrix(&self, display_w: f32, display_h: f32) -> [f32; 6] {
        let width = text_width(self.font, self.text, self.size);
        match self.position {
            TextPosition::Diagonal => {
                let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
                let (half_w, half_h) = (width / 2.0, self.size * CAP_HEIGHT / 2.0);
                let x = display_w / 2.0 - (half_w * cos - half_h * sin);
                let y = display_h / 2.0 - (half_w * sin + half_h * cos);
                [cos, sin, -sin, cos, x, y]
            }
            TextPosition::Anchored(anchor) => {
                let (x, y) = anchored_origin(anchor, display_w, display_h, width, self.size, self.margin);
                [1.0, 0.0, 0.0, 1.0, x, y]
            }
        }
    }
}

/// Baseline origin of a label of `width` points anchored on a page.
fn anchored_origin(anchor: Anchor, page_w: f32, page_h: f32, width: f32, size: f32, margin: f32) -> (f32, f32) {
    let (vertical, horizontal) = anchor.split();
    let x = match horizontal {
        Horizontal::Left => margin,
        Horizontal::Center => page_w / 2.0 - width / 2.0,
        Horizontal::Right => page_w - margin - width,
    };
    let y = match vertical {
        Vertical::Top => page_h - margin - size,
        Vertical::Middle => page_h / 2.0 - size * CAP_HEIGHT / 2.0,
        Vertical::Bottom => margin,
    };
    (x, y)
}

/// Matrix taking display-space coordinates to unrotated page space.
fn display_to_page(page: &Page) -> [f32; 6] {
    let (x0, y0) = page.origin;
    let (w, h) = (page.width, page.height);
    match page.rotation {
        90 => [0.0, 1.0, -1.0, 0.0, x0 + w, y0],
        180 => [-1.0, 0.0, 0.0, -1.0, x0 + w, y0 + h],
        270 => [0.0, -1.0, 1.0, 0.0, x0, y0 + h],
        _ => [1.0, 0.0, 0.0, 1.0, x0, y0],
    }
}

fn write_text_stamp(
    out: &mut String,
    page: &Page,
    stamp: &TextStampLayout<'_>,
    font_name: &str,
    state_name: Option<&str>,
    color: Rgb,
) {
    let (display_w, display_h) = page.displayed_size();
    let [r, g, b] = color.to_unit();

    out.push_str("q ");
    let _ = write!(out, "{} cm ", matrix(display_to_page(page)));
    if let Some(state) = state_name {
        let _ = write!(out, "/{state} gs ");
    }
    let _ = writeln!(
        out,
        "{} {} {} rg BT /{font_name} {} Tf {} Tm <{}> Tj ET Q",
        num(r),
        num(g),
        num(b),
        num(stamp.size),
        matrix(stamp.text_matrix(display_w, display_h)),
        hex::encode(encode_win_ansi(stamp.text)),
    );
}

fn matrix(m: [f32; 6]) -> String {
    m.iter().map(|v| num(*v)).collect::<Vec<_>>().join(" ")
}

/// Compact decimal for content streams: at most four places, no trailing
/// zeros, never `-0`.
fn num(value: f32) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::CanvasSize;
    use crate::test_support::{document_with_pages, document_with_sizes};
    use image::{Rgba, RgbaImage};
    use lopdf::content::Content;

    fn compositor(config: &EngineConfig) -> OverlayCompositor<'_> {
        OverlayCompositor::new(config)
    }

    fn ctx() -> OpContext<'static> {
        OpContext::default()
    }

    fn operators(doc: &Document, number: u32) -> Vec<String> {
        let page = doc.page(number).unwrap();
        let content = Content::decode(&doc.page_content(page.content_ref)).unwrap();
        content.operations.into_iter().map(|op| op.operator).collect()
    }

    #[test]
    fn num_is_compact() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.00001), "0");
        assert_eq!(num(595.2756), "595.2756");
    }

    #[test]
    fn watermark_is_drawn_after_existing_content() {
        let config = EngineConfig::default();
        let doc = document_with_pages(2);
        let out = compositor(&config).add_watermark(&doc, "DRAFT", 0.3, &ctx()).unwrap();

        assert_eq!(out.page_count(), 2);
        for number in 1..=2 {
            let ops = operators(&out, number);
            assert_eq!(ops.first().map(String::as_str), Some("q"));
            let original_tj = ops.iter().position(|op| op == "Tj").unwrap();
            let watermark_tj = ops.iter().rposition(|op| op == "Tj").unwrap();
            assert!(watermark_tj > original_tj);
            assert!(ops.contains(&"gs".to_string()));
        }
        // Inputs are untouched.
        assert_eq!(doc.page_fingerprints(), document_with_pages(2).page_fingerprints());
    }

    #[test]
    fn watermark_rejects_bad_arguments() {
        let config = EngineConfig::default();
        let doc = document_with_pages(1);
        let c = compositor(&config);
        assert!(matches!(c.add_watermark(&doc, "X", 1.5, &ctx()), Err(FolioError::InvalidArgument(_))));
        assert!(matches!(c.add_watermark(&doc, "X", -0.1, &ctx()), Err(FolioError::InvalidArgument(_))));
        assert!(matches!(c.add_watermark(&doc, "  ", 0.5, &ctx()), Err(FolioError::InvalidArgument(_))));
    }

    #[test]
    fn watermark_is_centred_on_the_page() {
        let stamp = TextStampLayout {
            text: "DRAFT",
            position: TextPosition::Diagonal,
            font: StandardFont::Helvetica,
            size: 60.0,
            margin: 30.0,
        };
        let [a, b, c, d, e, f] = stamp.text_matrix(600.0, 800.0);
        let width = text_width(StandardFont::Helvetica, "DRAFT", 60.0);
        let (u, v) = (width / 2.0, 60.0 * CAP_HEIGHT / 2.0);
        // The middle of the text box maps to the page centre.
        assert!((a * u + c * v + e - 300.0).abs() < 0.01);
        assert!((b * u + d * v + f - 400.0).abs() < 0.01);
        assert!(b > 0.0, "text rises to the right");
    }

    #[test]
    fn page_number_positions() {
        let (w, h, tw, size, margin) = (600.0, 800.0, 40.0, 12.0, 30.0);
        assert_eq!(anchored_origin(Anchor::BottomLeft, w, h, tw, size, margin), (30.0, 30.0));
        assert_eq!(anchored_origin(Anchor::BottomCenter, w, h, tw, size, margin), (280.0, 30.0));
        assert_eq!(anchored_origin(Anchor::TopRight, w, h, tw, size, margin), (530.0, 758.0));
        let (_, middle) = anchored_origin(Anchor::MiddleLeft, w, h, tw, size, margin);
        assert!((middle - (400.0 - 4.2)).abs() < 1e-4);
    }

    #[test]
    fn page_numbers_fill_in_the_template() {
        let config = EngineConfig::default();
        let doc = document_with_pages(3);
        let out = compositor(&config)
            .add_page_numbers(&doc, Anchor::BottomCenter, "{page} / {total}", &ctx())
            .unwrap();

        let page = out.page(2).unwrap();
        let content = out.page_content(page.content_ref);
        let expected = format!("<{}> Tj", hex::encode("2 / 3"));
        assert!(String::from_utf8_lossy(&content).contains(&expected));
        assert!(compositor(&config).add_page_numbers(&doc, Anchor::TopLeft, "", &ctx()).is_err());
    }

    #[test]
    fn background_goes_beneath_content() {
        let config = EngineConfig::default();
        let doc = document_with_pages(1);
        let out = compositor(&config).set_background_color(&doc, "#FFEECC", &ctx()).unwrap();

        let ops = operators(&out, 1);
        assert_eq!(&ops[..5], ["q", "rg", "re", "f", "Q"]);
        assert_eq!(ops.iter().filter(|op| *op == "Tj").count(), 1);
    }

    #[test]
    fn background_requires_exact_hex() {
        let config = EngineConfig::default();
        let doc = document_with_pages(1);
        for bad in ["FFEECC", "#FFF", "#GGGGGG", "#FFEECC0"] {
            assert!(matches!(
                compositor(&config).set_background_color(&doc, bad, &ctx()),
                Err(FolioError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn flatten_only_touches_pages_with_overlays() {
        let config = EngineConfig {
            overlay_raster_dpi: 36.0,
            ..EngineConfig::default()
        };
        let doc = document_with_pages(3);
        let mut overlays = OverlaySet::new();
        overlays.add(
            OverlayTarget::Page(1),
            OverlayItem::InkStroke {
                points: vec![(10.0, 10.0), (50.0, 50.0)],
                thickness: 3.0,
                color: Rgb::new(255, 0, 0),
                canvas: CanvasSize::new(100.0, 140.0),
            },
        );
        overlays.add(
            OverlayTarget::Page(1),
            OverlayItem::RasterImage {
                image: RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255])),
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 20.0,
                canvas: CanvasSize::new(100.0, 140.0),
            },
        );

        let out = compositor(&config).flatten_overlays(&doc, &overlays, &ctx()).unwrap();
        let before = doc.page_fingerprints();
        let after = out.page_fingerprints();
        assert_eq!(after[0], before[0]);
        assert_ne!(after[1], before[1]);
        assert_eq!(after[2], before[2]);

        // Exactly one image is drawn for the two raster items.
        let ops = operators(&out, 2);
        assert_eq!(ops.iter().filter(|op| *op == "Do").count(), 1);
    }

    #[test]
    fn raster_layer_matches_displayed_size_of_rotated_pages() {
        let config = EngineConfig {
            overlay_raster_dpi: 72.0,
            ..EngineConfig::default()
        };
        let doc = document_with_sizes(&[(200.0, 100.0)]);
        let doc = crate::ops::rotate_pages(&doc, 90, None, &ctx()).unwrap();
        let mut overlays = OverlaySet::new();
        overlays.add(
            OverlayTarget::All,
            OverlayItem::InkStroke {
                points: vec![(5.0, 5.0)],
                thickness: 2.0,
                color: Rgb::BLACK,
                canvas: CanvasSize::new(100.0, 200.0),
            },
        );

        let out = compositor(&config).flatten_overlays(&doc, &overlays, &ctx()).unwrap();
        let images: Vec<(i64, i64)> = out
            .raw()
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| stream.dict.has(b"SMask"))
            .map(|stream| {
                (
                    stream.dict.get(b"Width").unwrap().as_i64().unwrap(),
                    stream.dict.get(b"Height").unwrap().as_i64().unwrap(),
                )
            })
            .collect();
        // Displayed 100 x 200, unrotated back to the 200 x 100 MediaBox.
        assert_eq!(images, vec![(200, 100)]);
    }

    #[test]
    fn rotated_pages_get_a_display_matrix() {
        let doc = document_with_sizes(&[(200.0, 100.0)]);
        let doc = crate::ops::rotate_pages(&doc, 90, None, &ctx()).unwrap();
        let page = doc.page(1).unwrap();
        let [a, b, c, d, e, f] = display_to_page(&page);
        // Display top-left (0, 200) lands on the page's bottom-left corner.
        assert_eq!((a * 0.0 + c * 200.0 + e, b * 0.0 + d * 200.0 + f), (0.0, 0.0));
    }

    #[test]
    fn empty_overlay_set_copies_pages() {
        let config = EngineConfig::default();
        let doc = document_with_pages(2);
        let out = compositor(&config).flatten_overlays(&doc, &OverlaySet::new(), &ctx()).unwrap();
        assert_eq!(out.page_fingerprints(), doc.page_fingerprints());
    }
}
