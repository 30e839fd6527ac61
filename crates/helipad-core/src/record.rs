// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The pair of file extensions that mark a scenery file as active or disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneryExtensions {
    pub active: String,
    pub disabled: String,
}

impl Default for SceneryExtensions {
    fn default() -> Self {
        Self {
            active: "bgl".to_string(),
            disabled: "OFF".to_string(),
        }
    }
}

impl SceneryExtensions {
    pub fn new(active: &str, disabled: &str) -> Self {
        Self {
            active: active.trim_start_matches('.').to_string(),
            disabled: disabled.trim_start_matches('.').to_string(),
        }
    }

    pub fn is_active(&self, path: &Path) -> bool {
        has_extension(path, &self.active)
    }

    pub fn is_disabled(&self, path: &Path) -> bool {
        has_extension(path, &self.disabled)
    }

    pub fn is_scenery(&self, path: &Path) -> bool {
        self.is_active(path) || self.is_disabled(path)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    Unmatched,
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelipadRecord {
    pub kind: String,      // e.g. Other, Location
    pub name: String,      // e.g. Autogen Helipad HXZB3
    pub ident: String,     // join key against scenery filenames
    pub lat: f64,          // degrees
    pub lon: f64,          // degrees
    pub elevation_m: f64,
    pub mag_var: f64,      // degrees
    pub tags: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scenery_path: Option<PathBuf>,
}

impl HelipadRecord {
    pub fn match_state(&self, exts: &SceneryExtensions) -> MatchState {
        match &self.scenery_path {
            None => MatchState::Unmatched,
            Some(p) if exts.is_disabled(p) => MatchState::Inactive,
            Some(_) => MatchState::Active,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.scenery_path.is_some()
    }

    pub fn is_inactive(&self, exts: &SceneryExtensions) -> bool {
        self.match_state(exts) == MatchState::Inactive
    }

    /// Returns a copy of this record pointing at `path`; `self` is left as-is.
    pub fn with_scenery_path(&self, path: Option<PathBuf>) -> Self {
        Self {
            scenery_path: path,
            ..self.clone()
        }
    }

    /// Flips the matched scenery file and returns the record that reflects the rename.
    pub fn toggled(
        &self,
        exts: &SceneryExtensions,
    ) -> Result<(Self, crate::toggler::ToggleOutcome), crate::HelipadError> {
        let path = self
            .scenery_path
            .as_deref()
            .ok_or_else(|| crate::HelipadError::Unmatched(self.ident.clone()))?;
        let outcome = crate::toggler::toggle(path, exts)?;
        Ok((self.with_scenery_path(Some(outcome.new_path.clone())), outcome))
    }
}
