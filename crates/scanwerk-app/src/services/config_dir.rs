// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration lookup.

use std::path::{Path, PathBuf};

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;
use tracing::{debug, info};

/// Directory holding `config.json`.
pub fn config_dir() -> PathBuf {
    config_base(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join("scanwerk")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_base(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

/// Load the configuration.
///
/// An explicit path must exist. Without one the default location is tried
/// and built-in defaults are used when nothing is there.
pub fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    let config = match explicit {
        Some(path) => ScanConfig::load(path)?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                ScanConfig::load(&path)?
            } else {
                debug!(path = %path.display(), "no config file; using defaults");
                ScanConfig::default()
            }
        }
    };
    config.validate()?;
    info!("configuration ready");
    Ok(config)
}
