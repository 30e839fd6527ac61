// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::SceneryExtensions;
use crate::HelipadError;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A scenery file whose identifier was already claimed by an earlier file in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateIdent {
    pub ident: String,
    pub kept: PathBuf,
    pub dropped: PathBuf,
}

/// Case-insensitive identifier → scenery file lookup. The first file seen for an
/// identifier wins; later ones are only recorded in `duplicates`.
#[derive(Debug, Clone, Default)]
pub struct SceneryIndex {
    root: PathBuf,
    entries: HashMap<String, PathBuf>,
    duplicates: Vec<DuplicateIdent>,
    files_scanned: usize,
}

impl SceneryIndex {
    /// Scans `root` recursively, active files first, then disabled ones.
    /// Directory entries are visited in file-name order so the winner of a
    /// duplicate identifier does not depend on the platform's enumeration order.
    pub fn build<P: AsRef<Path>>(root: P, exts: &SceneryExtensions) -> Result<Self, HelipadError> {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|e| HelipadError::from_io(root, e))?;
        if !metadata.is_dir() {
            return Err(HelipadError::NotFound(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|e| HelipadError::from_io(root, e))?;

        let passes = [exts.active.as_str(), exts.disabled.as_str()];
        let paths = passes
            .into_iter()
            .flat_map(|ext| scan_pass(root, ext))
            .collect::<Vec<_>>();
        let index = Self::from_paths(root, paths);

        info!(
            "Indexed scenery — root={} files={} idents={} duplicates={}",
            root.display(),
            index.files_scanned,
            index.entries.len(),
            index.duplicates.len()
        );
        Ok(index)
    }

    /// Builds an index from an already-ordered list of files. Order is significant:
    /// the first path per identifier is kept.
    pub fn from_paths<I>(root: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut index = Self {
            root: root.to_path_buf(),
            ..Self::default()
        };
        for path in paths {
            index.insert(path);
        }
        index
    }

    fn insert(&mut self, path: PathBuf) {
        self.files_scanned += 1;
        let Some(ident) = extract_ident(&path) else {
            return;
        };

        let key = ident.to_uppercase();
        match self.entries.get(&key) {
            Some(kept) => {
                debug!(
                    "Duplicate ident {} — kept={} dropped={}",
                    ident,
                    kept.display(),
                    path.display()
                );
                self.duplicates.push(DuplicateIdent {
                    ident,
                    kept: kept.clone(),
                    dropped: path,
                });
            }
            None => {
                self.entries.insert(key, path);
            }
        }
    }

    pub fn get(&self, ident: &str) -> Option<&Path> {
        self.entries
            .get(&ident.trim().to_uppercase())
            .map(PathBuf::as_path)
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.get(ident).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upper-cased identifiers and their paths, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    pub fn duplicates(&self) -> &[DuplicateIdent] {
        &self.duplicates
    }
}

fn scan_pass(root: &Path, ext: &str) -> Vec<PathBuf> {
    let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    let mut found = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
            .unwrap_or(false);
        if matches {
            found.push(entry.into_path());
        }
    }

    found
}

/// The identifier embedded in a scenery filename: the last underscore-delimited token
/// of the stem. `SCENERY_OBJ_HXZB3.bgl` yields `HXZB3`; a stem without an underscore
/// yields nothing.
pub fn extract_ident(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let (_, last) = stem.rsplit_once('_')?;
    if last.is_empty() {
        return None;
    }
    Some(last.to_string())
}
