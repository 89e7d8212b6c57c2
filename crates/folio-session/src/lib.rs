// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-session — Everything a front end needs around the PDF engine.
//
// The editing session that owns pending overlays, the recent-documents list,
// the tool registry, the data directory and persisted configuration, the
// rendering collaborator interfaces, and an async `Workbench` that runs
// engine operations off the caller's thread.

pub mod config;
pub mod data_dir;
pub mod recent;
pub mod registry;
pub mod render;
pub mod session;
pub mod workbench;

pub use config::{load_config, persist_config};
pub use recent::{RecentDocument, RecentDocuments};
pub use registry::{Availability, ToolDescriptor, ToolRegistry};
pub use render::{PageRenderer, RenderSource};
pub use session::EditingSession;
pub use workbench::{JobControl, Workbench};

#[cfg(test)]
pub(crate) mod test_support {
    use folio_core::PaperSize;
    use folio_document::PdfEngine;

    /// Route engine logs to the test harness when `RUST_LOG` is set.
    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// An encoded PDF with `pages` blank A4 pages.
    pub(crate) fn blank_pdf(pages: usize) -> Vec<u8> {
        let engine = PdfEngine::default();
        let one = engine.blank_document(PaperSize::A4).expect("blank document");
        let inputs: Vec<&[u8]> = (0..pages).map(|_| one.as_slice()).collect();
        engine
            .merge(&inputs, &Default::default())
            .expect("merge blank pages")
    }
}
