// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

/// Return the application data directory for `app_name`, creating it if
/// needed.
pub fn data_dir(app_name: &str) -> PathBuf {
    let dir = base_dir().join(app_name);
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn base_dir() -> PathBuf {
    // XDG first, then the conventional home location, then Windows.
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    if let Ok(app_data) = std::env::var("APPDATA") {
        return PathBuf::from(app_data);
    }
    // Last resort
    std::env::temp_dir()
}
