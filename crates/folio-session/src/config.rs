// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load and persist `AppConfig` as `config.json` in the data directory.

use std::path::Path;

use folio_core::AppConfig;
use folio_core::error::Result;
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

/// Read the persisted configuration. A missing file yields the defaults; so
/// does an unreadable one, after a warning.
pub fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(_) => {
            debug!(path = %path.display(), "no saved config, using defaults");
            return AppConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "ignoring invalid config: {e}");
            AppConfig::default()
        }
    }
}

pub fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
