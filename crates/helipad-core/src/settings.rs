// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::SceneryExtensions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User settings persisted between runs. Passed explicitly to whatever needs them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default, alias = "CommunityFolder")]
    pub community_folder: Option<PathBuf>,
    #[serde(default, alias = "CsvPath")]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub extensions: SceneryExtensions,
}

impl AppSettings {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("settings.json")
    }

    /// Missing file → defaults. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create settings directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
