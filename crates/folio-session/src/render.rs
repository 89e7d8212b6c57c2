// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interfaces to the page rasteriser used for previews.
//
// Rendering lives outside this workspace; the traits pin down how a renderer
// obtains the bytes it draws.

use folio_core::error::Result;
use image::RgbaImage;

/// Something that can hand its current PDF bytes to a renderer.
pub trait RenderSource {
    /// The bytes a preview should show right now.
    fn renderable_bytes(&self) -> &[u8];
}

impl RenderSource for Vec<u8> {
    fn renderable_bytes(&self) -> &[u8] {
        self
    }
}

/// Rasterises pages of a [`RenderSource`].
pub trait PageRenderer: Send + Sync {
    fn page_count(&self, source: &dyn RenderSource) -> Result<usize>;

    /// Render page `index` (0-based) at `scale` pixels per point.
    fn render_page(&self, source: &dyn RenderSource, index: usize, scale: f32) -> Result<RgbaImage>;
}
