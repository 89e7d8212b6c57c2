// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — Core types, configuration, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod progress;
pub mod types;

pub use config::{AppConfig, EngineConfig};
pub use error::{FolioError, Result};
pub use progress::{CancelToken, OpContext, ProgressSink, ProgressTracker};
pub use types::*;
