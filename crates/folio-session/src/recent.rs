// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recently opened documents, kept as a small JSON file in the data directory.
//
// The list is most-recent-first, holds each path once, and never grows past
// its capacity. Entries whose file has since disappeared are hidden when
// listing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use folio_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const RECENT_FILE: &str = "recent_documents.json";

/// One entry of the recent-documents list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocument {
    pub file_path: PathBuf,
    pub file_name: String,
    pub last_accessed: DateTime<Utc>,
}

/// File-backed recent-documents store.
///
/// Clones share one lock, so concurrent updates through any of them are
/// applied one after another.
#[derive(Debug, Clone)]
pub struct RecentDocuments {
    path: PathBuf,
    capacity: usize,
    file_lock: Arc<Mutex<()>>,
}

impl RecentDocuments {
    /// Store inside `data_dir`, keeping at most `capacity` entries.
    pub fn new(data_dir: &Path, capacity: usize) -> Self {
        Self {
            path: data_dir.join(RECENT_FILE),
            capacity,
            file_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Record that `file` was just opened, moving it to the front.
    pub fn add(&self, file: &Path) -> Result<()> {
        let _guard = self.lock();
        let mut entries = self.read();
        entries.retain(|entry| entry.file_path != file);

        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        entries.insert(
            0,
            RecentDocument {
                file_path: file.to_path_buf(),
                file_name,
                last_accessed: Utc::now(),
            },
        );
        entries.truncate(self.capacity);

        debug!(path = %file.display(), entries = entries.len(), "recent document recorded");
        self.write(&entries)
    }

    /// Entries whose file still exists, most recent first.
    pub fn list(&self) -> Vec<RecentDocument> {
        let _guard = self.lock();
        self.read()
            .into_iter()
            .filter(|entry| entry.file_path.exists())
            .collect()
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock();
        self.write(&[])
    }

    // The guarded value is `()`, so a poisoned lock holds nothing stale.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.file_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> Vec<RecentDocument> {
        let Ok(data) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_str(&data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "recent documents unreadable, starting fresh: {e}");
                Vec::new()
            }
        }
    }

    fn write(&self, entries: &[RecentDocument]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
