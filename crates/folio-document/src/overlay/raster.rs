// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster layer for ink strokes and placed images.
//
// All raster items of one page are painted into a single transparent RGBA
// image the size of the displayed page, turned back into unrotated page
// space, and embedded as one image XObject with a soft mask.

use flate2::Compression;
use folio_core::error::Result;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, warn};

use super::{CanvasSize, OverlayItem};
use crate::model::Document;
use crate::pdf::writer::deflate;

/// Upper bound on either side of a raster layer, in pixels.
const MAX_LAYER_SIDE: f32 = 8192.0;

/// Pixel size of the layer for a page displayed at `width` x `height`
/// points, rendered at `dpi`.
pub(crate) fn layer_size(width: f32, height: f32, dpi: f32) -> (u32, u32) {
    let scale = dpi / 72.0;
    let side = |points: f32| (points * scale).round().clamp(1.0, MAX_LAYER_SIDE) as u32;
    (side(width), side(height))
}

/// Paint every raster item onto a transparent `width` x `height` layer, in
/// order. Items whose canvas size is unusable are skipped.
pub(crate) fn paint_layer(items: &[&OverlayItem], width: u32, height: u32) -> RgbaImage {
    let mut layer = RgbaImage::new(width, height);

    for item in items {
        match item {
            OverlayItem::RasterImage {
                image,
                x,
                y,
                width: item_w,
                height: item_h,
                canvas,
            } => {
                let Some((sx, sy)) = canvas_scale(canvas, width, height) else {
                    continue;
                };
                let target_w = (item_w * sx).round();
                let target_h = (item_h * sy).round();
                if target_w < 1.0 || target_h < 1.0 || image.width() == 0 || image.height() == 0 {
                    debug!(target_w, target_h, "Skipping zero-sized image overlay");
                    continue;
                }
                let resized = imageops::resize(
                    image,
                    target_w.min(MAX_LAYER_SIDE) as u32,
                    target_h.min(MAX_LAYER_SIDE) as u32,
                    FilterType::Triangle,
                );
                imageops::overlay(
                    &mut layer,
                    &resized,
                    (x * sx).round() as i64,
                    (y * sy).round() as i64,
                );
            }
            OverlayItem::InkStroke {
                points,
                thickness,
                color,
                canvas,
            } => {
                let Some((sx, sy)) = canvas_scale(canvas, width, height) else {
                    continue;
                };
                let pixel = Rgba([color.r, color.g, color.b, 255]);
                let radius = thickness * (sx + sy) / 2.0 / 2.0;
                let scaled: Vec<(f32, f32)> = points.iter().map(|&(px, py)| (px * sx, py * sy)).collect();
                draw_stroke(&mut layer, &scaled, radius, pixel);
            }
            OverlayItem::TextStamp { .. } | OverlayItem::SolidFill { .. } => {}
        }
    }

    layer
}

fn canvas_scale(canvas: &CanvasSize, width: u32, height: u32) -> Option<(f32, f32)> {
    if !canvas.is_usable() {
        warn!(?canvas, "Overlay captured on an unusable canvas, skipping");
        return None;
    }
    Some((width as f32 / canvas.width, height as f32 / canvas.height))
}

/// Round-capped polyline: discs stamped along each segment.
fn draw_stroke(layer: &mut RgbaImage, points: &[(f32, f32)], radius: f32, pixel: Rgba<u8>) {
    if radius < 1.0 {
        match points {
            [] => {}
            [only] => draw_line_segment_mut(layer, *only, *only, pixel),
            _ => {
                for pair in points.windows(2) {
                    draw_line_segment_mut(layer, pair[0], pair[1], pixel);
                }
            }
        }
        return;
    }

    let disc = radius.round() as i32;
    let stamp = |layer: &mut RgbaImage, (x, y): (f32, f32)| {
        draw_filled_circle_mut(layer, (x.round() as i32, y.round() as i32), disc, pixel);
    };

    match points {
        [] => {}
        [only] => stamp(layer, *only),
        _ => {
            let step = (radius / 2.0).max(0.5);
            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
                let steps = (length / step).ceil().max(1.0) as u32;
                for i in 0..=steps {
                    let t = i as f32 / steps as f32;
                    stamp(layer, (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
                }
            }
        }
    }
}

/// Turn a layer painted in display orientation back into unrotated page
/// space for a page with clockwise display `rotation`.
pub(crate) fn unrotate(layer: RgbaImage, rotation: i32) -> RgbaImage {
    match rotation {
        90 => imageops::rotate270(&layer),
        180 => imageops::rotate180(&layer),
        270 => imageops::rotate90(&layer),
        _ => layer,
    }
}

/// Embed `layer` as an RGB image XObject whose alpha channel becomes a
/// DeviceGray `/SMask`. Both streams are stored flate-compressed.
pub(crate) fn embed_layer(doc: &mut Document, layer: &RgbaImage) -> Result<ObjectId> {
    let (width, height) = layer.dimensions();
    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in layer.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mask = image_stream(width, height, "DeviceGray", deflate(&alpha, Compression::default())?);
    let mask_id = doc.add_stream(mask);

    let mut image = image_stream(width, height, "DeviceRGB", deflate(&rgb, Compression::default())?);
    image.dict.set("SMask", Object::Reference(mask_id));
    let image_id = doc.add_stream(image);

    debug!(width, height, "Overlay layer embedded");
    Ok(image_id)
}

fn image_stream(width: u32, height: u32, color_space: &str, data: Vec<u8>) -> Stream {
    let dict = Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ]);
    Stream::new(dict, data).with_compression(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Rgb;

    fn canvas(w: f32, h: f32) -> CanvasSize {
        CanvasSize::new(w, h)
    }

    #[test]
    fn layer_size_follows_dpi() {
        assert_eq!(layer_size(595.0, 842.0, 72.0), (595, 842));
        assert_eq!(layer_size(595.0, 842.0, 144.0), (1190, 1684));
        assert_eq!(layer_size(100_000.0, 10.0, 144.0), (8192, 20));
    }

    #[test]
    fn image_placement_uses_the_captured_canvas() {
        let red = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        // Captured on a canvas half the size of the layer.
        let item = OverlayItem::RasterImage {
            image: red,
            x: 10.0,
            y: 20.0,
            width: 10.0,
            height: 10.0,
            canvas: canvas(100.0, 100.0),
        };
        let layer = paint_layer(&[&item], 200, 200);

        assert_eq!(layer.get_pixel(25, 45).0, [255, 0, 0, 255]);
        assert_eq!(layer.get_pixel(19, 45).0[3], 0);
        assert_eq!(layer.get_pixel(25, 39).0[3], 0);
        assert_eq!(layer.get_pixel(40, 60).0[3], 0);
    }

    #[test]
    fn ink_scales_per_axis() {
        let stroke = OverlayItem::InkStroke {
            points: vec![(10.0, 50.0), (90.0, 50.0)],
            thickness: 4.0,
            color: Rgb::new(0, 0, 255),
            canvas: canvas(100.0, 100.0),
        };
        let layer = paint_layer(&[&stroke], 400, 200);

        // (50, 50) on the canvas lands at (200, 100) on the layer.
        assert_eq!(layer.get_pixel(200, 100).0, [0, 0, 255, 255]);
        assert_eq!(layer.get_pixel(200, 20).0[3], 0);
    }

    #[test]
    fn unusable_canvas_is_ignored() {
        let stroke = OverlayItem::InkStroke {
            points: vec![(1.0, 1.0)],
            thickness: 2.0,
            color: Rgb::BLACK,
            canvas: canvas(0.0, 100.0),
        };
        let layer = paint_layer(&[&stroke], 10, 10);
        assert!(layer.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn unrotate_swaps_axes_for_quarter_turns() {
        let layer = RgbaImage::new(30, 10);
        assert_eq!(unrotate(layer.clone(), 90).dimensions(), (10, 30));
        assert_eq!(unrotate(layer.clone(), 180).dimensions(), (30, 10));
        assert_eq!(unrotate(layer, 0).dimensions(), (30, 10));
    }

    #[test]
    fn unrotate_maps_display_top_left_to_page_space() {
        // Page rotated 90 clockwise: the displayed top-left corner is the
        // unrotated page's bottom-left.
        let mut layer = RgbaImage::new(4, 2);
        layer.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        let page = unrotate(layer, 90);
        assert_eq!(page.dimensions(), (2, 4));
        assert_eq!(page.get_pixel(0, 3).0, [1, 2, 3, 255]);
    }

    #[test]
    fn embedded_layer_carries_a_soft_mask() {
        let mut doc = Document::new_empty();
        let layer = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 128]));
        let id = embed_layer(&mut doc, &layer).unwrap();

        let stream = doc.raw().get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        let mask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let mask = doc.raw().get_object(mask_id).unwrap().as_stream().unwrap();
        assert_eq!(mask.decompressed_content().unwrap(), vec![128; 6]);
        assert_eq!(stream.decompressed_content().unwrap().len(), 18);
    }
}
