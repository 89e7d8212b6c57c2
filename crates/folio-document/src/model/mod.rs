// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — ordered pages with geometry plus the information dictionary.

pub mod document;
pub mod info;
pub mod page;

pub use document::Document;
pub use page::Page;
