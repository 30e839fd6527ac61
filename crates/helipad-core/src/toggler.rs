// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::SceneryExtensions;
use crate::HelipadError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToggleAction {
    Disabled,
    Restored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleOutcome {
    pub previous: PathBuf,
    pub new_path: PathBuf,
    pub action: ToggleAction,
    pub message: String,
}

/// Renames a scenery file between its active and disabled extension.
/// Files with any other extension are rejected before the filesystem is touched, and
/// an existing file at the destination is never overwritten.
pub fn toggle(path: &Path, exts: &SceneryExtensions) -> Result<ToggleOutcome, HelipadError> {
    let (action, target_ext) = if exts.is_disabled(path) {
        (ToggleAction::Restored, exts.active.as_str())
    } else if exts.is_active(path) {
        (ToggleAction::Disabled, exts.disabled.as_str())
    } else {
        return Err(HelipadError::UnsupportedFormat(path.to_path_buf()));
    };

    let new_path = path.with_extension(target_ext);
    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(HelipadError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", new_path.display()),
            ),
        });
    }

    fs::rename(path, &new_path).map_err(|source| HelipadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = new_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let message = match action {
        ToggleAction::Disabled => format!("Disabled: {}", file_name),
        ToggleAction::Restored => format!("Restored: {}", file_name),
    };
    log::info!("{} ({})", message, path.display());

    Ok(ToggleOutcome {
        previous: path.to_path_buf(),
        new_path,
        action,
        message,
    })
}
