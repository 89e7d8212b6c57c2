// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF serialization boundary — parsing, encoding, cross-document page import,
// and image-to-PDF generation.

pub mod images;
pub(crate) mod import;
pub mod reader;
pub mod writer;

pub use images::ImageConverter;
pub use reader::{open, parse};
pub use writer::encode;
