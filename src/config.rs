//! Startup configuration.
//!
//! Read once from the environment:
//! 1. `EDUGRADE_BRIDGE` - command line of the spreadsheet bridge. When it
//!    names a runnable program the remote backend is used, otherwise the
//!    local fallback.
//! 2. `EDUGRADE_DATA_DIR` - directory of the local store, else
//!    `$HOME/.local/share/edugrade`, else `./data`.
//! 3. `EDUGRADE_LOG` - tracing filter (falls back to `RUST_LOG`, then `info`).

use std::path::{Path, PathBuf};

pub const BRIDGE_ENV: &str = "EDUGRADE_BRIDGE";
pub const DATA_DIR_ENV: &str = "EDUGRADE_DATA_DIR";
pub const LOG_ENV: &str = "EDUGRADE_LOG";

const DEFAULT_DATA_DIR: &str = ".local/share/edugrade";
const DEV_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Remote { program: PathBuf, args: Vec<String> },
    Local,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendChoice,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let bridge = std::env::var(BRIDGE_ENV).ok();
        Self {
            backend: probe_bridge(bridge.as_deref()),
            data_dir: data_dir(
                std::env::var(DATA_DIR_ENV).ok(),
                std::env::var("HOME").ok(),
            ),
        }
    }
}

/// The bridge is present when the command line is non-blank and, for
/// programs given as a path, the file exists. Bare program names are
/// resolved by the OS at spawn time.
pub fn probe_bridge(raw: Option<&str>) -> BackendChoice {
    let Some(raw) = raw else {
        return BackendChoice::Local;
    };
    let mut parts = raw.split_whitespace();
    let Some(program) = parts.next() else {
        return BackendChoice::Local;
    };
    let program = PathBuf::from(program);
    if program.components().count() > 1 && !program.is_file() {
        tracing::warn!(program = %program.display(), "configured bridge not found");
        return BackendChoice::Local;
    }
    BackendChoice::Remote {
        program,
        args: parts.map(str::to_string).collect(),
    }
}

pub fn data_dir(explicit: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(dir) = explicit.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(home) = home {
        return Path::new(&home).join(DEFAULT_DATA_DIR);
    }
    PathBuf::from(DEV_DATA_DIR)
}
