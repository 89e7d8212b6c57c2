// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async service layer — runs engine operations on tokio's blocking pool so
// a UI thread never waits on PDF work.
//
// Each call is one task; nothing is shared between tasks except the engine
// configuration, the tool registry and the recent-documents file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::error::{FolioError, Result};
use folio_core::{AppConfig, CancelToken, OpContext, ProgressSink};
use folio_document::PdfEngine;
use tracing::{info, warn};

use crate::config::load_config;
use crate::data_dir;
use crate::recent::RecentDocuments;
use crate::registry::ToolRegistry;
use crate::session::EditingSession;

/// Progress and cancellation for one background job.
#[derive(Clone, Default)]
pub struct JobControl {
    pub progress: Option<Arc<dyn ProgressSink>>,
    pub cancel: Option<CancelToken>,
}

impl JobControl {
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Shared services. Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct Workbench {
    engine: Arc<PdfEngine>,
    registry: Arc<ToolRegistry>,
    recents: Arc<RecentDocuments>,
}

impl Workbench {
    /// Load the persisted configuration from the platform data directory and
    /// build the services around it.
    pub fn init() -> Self {
        let dir = data_dir::data_dir(&AppConfig::default().app_name);
        info!(path = %dir.display(), "initialising workbench");
        let config = load_config(&dir);
        Self::new(&config, &dir)
    }

    pub fn new(config: &AppConfig, data_dir: &Path) -> Self {
        Self {
            engine: Arc::new(PdfEngine::new(config.engine.clone())),
            registry: ToolRegistry::shared(),
            recents: Arc::new(RecentDocuments::new(data_dir, config.max_recent_documents)),
        }
    }

    pub fn engine(&self) -> &PdfEngine {
        &self.engine
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn recents(&self) -> &RecentDocuments {
        &self.recents
    }

    /// Run `operation` on the blocking pool and wait for its result.
    pub async fn run<T, F>(&self, control: JobControl, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PdfEngine, &OpContext<'_>) -> Result<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let mut ctx = OpContext::default();
            if let Some(sink) = control.progress.as_deref() {
                ctx = ctx.with_progress(sink);
            }
            if let Some(token) = control.cancel.as_ref() {
                ctx = ctx.with_cancel(token);
            }
            operation(&engine, &ctx)
        })
        .await
        .map_err(|e| FolioError::Pdf(format!("worker task failed: {e}")))?
    }

    /// Open `path` in a new editing session and remember it.
    pub async fn open(&self, path: PathBuf) -> Result<EditingSession> {
        let session = {
            let path = path.clone();
            self.run(JobControl::default(), move |engine, _| {
                EditingSession::open(&path, engine)
            })
            .await?
        };
        self.remember(path).await;
        Ok(session)
    }

    /// Merge `inputs` into `output`. Returns the page count of the result.
    pub async fn merge_files(
        &self,
        inputs: Vec<PathBuf>,
        output: PathBuf,
        control: JobControl,
    ) -> Result<usize> {
        let written = output.clone();
        let pages = self
            .run(control, move |engine, ctx| {
                let buffers = inputs
                    .iter()
                    .map(std::fs::read)
                    .collect::<std::io::Result<Vec<_>>>()?;
                let slices: Vec<&[u8]> = buffers.iter().map(Vec::as_slice).collect();
                let merged = engine.merge(&slices, ctx)?;
                std::fs::write(&written, &merged)?;
                engine.page_count(&merged)
            })
            .await?;
        info!(pages, output = %output.display(), "merge written");
        self.remember(output).await;
        Ok(pages)
    }

    /// Flatten and save `session` to `path`, handing the session back.
    pub async fn save(
        &self,
        mut session: EditingSession,
        path: PathBuf,
        control: JobControl,
    ) -> Result<EditingSession> {
        let target = path.clone();
        let session = self
            .run(control, move |engine, ctx| {
                session.save_as(engine, &target, ctx)?;
                Ok(session)
            })
            .await?;
        self.remember(path).await;
        Ok(session)
    }

    /// Record `path` in the recent list on the blocking pool. Failures are
    /// logged, not returned.
    async fn remember(&self, path: PathBuf) {
        let recents = Arc::clone(&self.recents);
        let recorded = tokio::task::spawn_blocking(move || recents.add(&path).map_err(|e| (path, e))).await;
        match recorded {
            Ok(Ok(())) => {}
            Ok(Err((path, e))) => {
                warn!(path = %path.display(), "could not update recent documents: {e}");
            }
            Err(e) => warn!("recent documents task failed: {e}"),
        }
    }
}
