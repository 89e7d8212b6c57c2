// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine and application configuration.

use serde::{Deserialize, Serialize};

use crate::types::EncodeOptions;

/// Tunables for the PDF engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compression applied whenever the engine encodes a result.
    pub encode: EncodeOptions,
    /// Font size (pt) of the diagonal watermark text.
    pub watermark_font_size: f32,
    /// Grey level of watermark text, 0.0 (black) to 1.0 (white).
    pub watermark_gray: f32,
    /// Font size (pt) used for page numbers.
    pub page_number_font_size: f32,
    /// Distance (pt) between a page-number anchor and the page edge.
    pub page_number_margin: f32,
    /// Resolution of the flattened ink/image raster layer.
    pub overlay_raster_dpi: f32,
    /// PDF header version for documents the engine creates from scratch.
    pub pdf_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            encode: EncodeOptions::default(),
            watermark_font_size: 60.0,
            watermark_gray: 0.5,
            page_number_font_size: 12.0,
            page_number_margin: 30.0,
            overlay_raster_dpi: 144.0,
            pdf_version: "1.5".into(),
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory name used under the platform data directory.
    pub app_name: String,
    /// Maximum entries kept in the recent-documents list.
    pub max_recent_documents: usize,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "folio".into(),
            max_recent_documents: 10,
            engine: EngineConfig::default(),
        }
    }
}
