// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod cluster;
pub mod csv_loader;
pub mod matcher;
pub mod record;
pub mod scenery_index;
pub mod session;
pub mod settings;
pub mod toggler;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use cluster::{GridPolicy, RenderCluster, Viewport};
pub use csv_loader::{CsvLoader, LoadReport, LoadStats};
pub use record::{HelipadRecord, MatchState, SceneryExtensions};
pub use scenery_index::SceneryIndex;
pub use session::HelipadSession;
pub use settings::AppSettings;
pub use toggler::{ToggleAction, ToggleOutcome};

#[derive(Error, Debug)]
pub enum HelipadError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Access denied: {}", .0.display())]
    AccessDenied(PathBuf),
    #[error("Unsupported file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Helipad {0} has no matched scenery file")]
    Unmatched(String),
    #[error("No helipad at position {0}")]
    NoSuchRecord(usize),
    #[error("Invalid grid policy: {0}")]
    InvalidGridPolicy(String),
}

impl HelipadError {
    /// Maps an IO error on `path` onto the taxonomy, keeping the cause for anything
    /// that is not a plain missing-path or permission failure.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => HelipadError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => HelipadError::AccessDenied(path.to_path_buf()),
            _ => HelipadError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Platform configuration directory for settings, falling back to the working directory.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "helipad-oxide", "Helipad-Oxide")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
