// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting and cooperative cancellation for engine operations.
//
// Every operation is a single unit of work processed page by page. Between
// pages it reports a percentage and checks the cancel flag.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FolioError, Result};

/// Receives integer percentages in `0..=100`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Operations notice at their next page boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-call context: where progress goes and how to stop early.
#[derive(Clone, Copy, Default)]
pub struct OpContext<'a> {
    pub progress: Option<&'a dyn ProgressSink>,
    pub cancel: Option<&'a CancelToken>,
}

impl<'a> OpContext<'a> {
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Start tracking a job of `total` units.
    pub fn tracker(&self, total: usize) -> ProgressTracker<'a> {
        ProgressTracker {
            sink: self.progress,
            cancel: self.cancel,
            total,
            done: 0,
            last: Cell::new(None),
        }
    }
}

impl std::fmt::Debug for OpContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpContext")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Converts "units done out of total" into monotonically non-decreasing
/// percentages, emitting each distinct value at most once.
pub struct ProgressTracker<'a> {
    sink: Option<&'a dyn ProgressSink>,
    cancel: Option<&'a CancelToken>,
    total: usize,
    done: usize,
    last: Cell<Option<u8>>,
}

impl ProgressTracker<'_> {
    /// Fail with [`FolioError::Cancelled`] if cancellation was requested.
    pub fn checkpoint(&self) -> Result<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(FolioError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Record one finished unit of work.
    pub fn advance(&mut self) {
        self.done = (self.done + 1).min(self.total);
        let percent = if self.total == 0 {
            100
        } else {
            (self.done * 100 / self.total) as u8
        };
        self.emit(percent);
    }

    /// Report 100%.
    pub fn finish(&mut self) {
        self.done = self.total;
        self.emit(100);
    }

    fn emit(&self, percent: u8) {
        let percent = percent.min(100);
        if self.last.get().is_some_and(|last| percent <= last) {
            return;
        }
        self.last.set(Some(percent));
        if let Some(sink) = self.sink {
            sink.report(percent);
        }
    }
}
