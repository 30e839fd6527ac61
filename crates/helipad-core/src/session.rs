// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::cluster::{cluster_viewport, GridPolicy, RenderCluster, Viewport};
use crate::csv_loader::{CsvLoader, LoadReport};
use crate::matcher::attach_matches;
use crate::record::{HelipadRecord, SceneryExtensions};
use crate::scenery_index::SceneryIndex;
use crate::settings::AppSettings;
use crate::toggler::ToggleOutcome;
use crate::HelipadError;
use log::warn;
use std::path::{Path, PathBuf};

/// What a map front end holds on to: the loaded helipads, the current scenery index and
/// the policies used to cluster and toggle them.
#[derive(Debug, Clone)]
pub struct HelipadSession {
    extensions: SceneryExtensions,
    policy: GridPolicy,
    community_folder: Option<PathBuf>,
    records: Vec<HelipadRecord>,
    index: Option<SceneryIndex>,
}

impl HelipadSession {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            extensions: settings.extensions.clone(),
            policy: GridPolicy::default(),
            community_folder: settings.community_folder.clone(),
            records: Vec::new(),
            index: None,
        }
    }

    pub fn with_grid_policy(mut self, policy: GridPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn records(&self) -> &[HelipadRecord] {
        &self.records
    }

    pub fn index(&self) -> Option<&SceneryIndex> {
        self.index.as_ref()
    }

    pub fn extensions(&self) -> &SceneryExtensions {
        &self.extensions
    }

    /// Replaces the loaded helipads with the contents of `path`. When a community folder
    /// is configured it is rescanned so the new records match what is on disk now.
    /// The returned report's `records` have been moved into the session.
    pub fn load_csv(&mut self, path: &Path) -> Result<LoadReport, HelipadError> {
        let mut report = CsvLoader::load_file(path)?;
        self.records = std::mem::take(&mut report.records);

        if let Some(folder) = self.community_folder.clone() {
            if let Err(e) = self.index_community(&folder) {
                warn!("Could not index community folder after load: {}", e);
                self.index = None;
            }
        }
        Ok(report)
    }

    pub fn set_records(&mut self, records: Vec<HelipadRecord>) {
        self.records = records;
        self.rematch();
    }

    /// Scans `folder` and attaches matches. On failure the previous index and matches
    /// are kept.
    pub fn index_community(&mut self, folder: &Path) -> Result<&SceneryIndex, HelipadError> {
        let index = SceneryIndex::build(folder, &self.extensions)?;
        self.records = attach_matches(&self.records, &index).records;
        self.community_folder = Some(folder.to_path_buf());
        Ok(self.index.insert(index))
    }

    /// Re-applies the current index. Returns the number of matched records.
    pub fn rematch(&mut self) -> usize {
        if let Some(index) = &self.index {
            self.records = attach_matches(&self.records, index).records;
        }
        self.matched_count()
    }

    pub fn matched_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_matched()).count()
    }

    pub fn find_by_ident(&self, ident: &str) -> Option<usize> {
        let ident = ident.trim();
        self.records
            .iter()
            .position(|r| r.ident.eq_ignore_ascii_case(ident))
    }

    pub fn clusters(&self, viewport: &Viewport) -> Vec<RenderCluster> {
        cluster_viewport(&self.records, viewport, &self.policy, &self.extensions)
    }

    /// Toggles the scenery file of the record at `index` and swaps in the updated record.
    pub fn toggle(&mut self, index: usize) -> Result<ToggleOutcome, HelipadError> {
        let record = self
            .records
            .get(index)
            .ok_or(HelipadError::NoSuchRecord(index))?;
        let (updated, outcome) = record.toggled(&self.extensions)?;
        self.records[index] = updated;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MatchState;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_session_flow() {
        let dir = tempdir().unwrap();
        let community = dir.path().join("Community");
        let pkg = community.join("simfocus-helipads").join("scenery");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("SCENERY_OBJ_HXZB3.bgl"), "").unwrap();

        let csv = dir.path().join("helipads.csv");
        fs::write(
            &csv,
            "Other,Autogen Helipad HXZB3,HXZB3,-27.47,153.03,10.0,7.5,\"Autogen\"\n\
             Other,Autogen Helipad HXZB4,HXZB4,-27.48,153.04,10.0,7.5,\"Autogen\"\n",
        )
        .unwrap();

        let settings = AppSettings {
            community_folder: Some(community.clone()),
            ..AppSettings::default()
        };
        let mut session = HelipadSession::new(&settings);
        let report = session.load_csv(&csv).unwrap();
        assert_eq!(report.stats.accepted, 2);
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.matched_count(), 1);

        let idx = session.find_by_ident("hxzb3").unwrap();
        let outcome = session.toggle(idx).unwrap();
        assert_eq!(outcome.new_path, pkg.join("SCENERY_OBJ_HXZB3.OFF"));
        assert_eq!(
            session.records()[idx].match_state(session.extensions()),
            MatchState::Inactive
        );

        let unmatched = session.find_by_ident("HXZB4").unwrap();
        assert!(matches!(
            session.toggle(unmatched),
            Err(HelipadError::Unmatched(_))
        ));
        assert!(matches!(
            session.toggle(99),
            Err(HelipadError::NoSuchRecord(99))
        ));

        // Zoom 10 puts both pads in the same 0.2° cell
        let clusters = session.clusters(&Viewport::new(-27.0, -28.0, 153.0, 154.0, 10.0));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 2);
    }

    #[test]
    fn test_clusters_without_community_folder() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("helipads.csv");
        fs::write(
            &csv,
            "Other,Pad One,HXA1,-27.45,153.05,10.0,7.5,tag\n\
             Other,Pad Two,HXA2,-27.55,153.15,10.0,7.5,tag\n\
             Other,Pad Far,HXA3,-20.10,150.10,10.0,7.5,tag\n",
        )
        .unwrap();

        let mut session = HelipadSession::new(&AppSettings::default());
        let report = session.load_csv(&csv).unwrap();
        assert_eq!(report.stats.accepted, 3);
        assert!(session.index().is_none());
        assert_eq!(session.matched_count(), 0);

        // Zoom 10 is a 0.2° grid: two pads share a cell, the third stands alone
        let clusters = session.clusters(&Viewport::new(-20.0, -28.0, 150.0, 154.0, 10.0));
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.iter().map(|c| c.count()).sum::<usize>(), 3);
        let singles: Vec<_> = clusters
            .iter()
            .filter_map(|c| match c {
                RenderCluster::Single { state, .. } => Some(*state),
                RenderCluster::Aggregate { .. } => None,
            })
            .collect();
        assert_eq!(singles, [MatchState::Unmatched]);

        assert!(matches!(
            session.toggle(0),
            Err(HelipadError::Unmatched(ref id)) if id == "HXA1"
        ));
    }

    #[test]
    fn test_failed_index_keeps_previous() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("PAD_AB1.bgl"), "").unwrap();

        let mut session = HelipadSession::new(&AppSettings::default());
        session.index_community(dir.path()).unwrap();
        assert_eq!(session.index().map(|i| i.len()), Some(1));

        let err = session
            .index_community(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, HelipadError::NotFound(_)));
        assert_eq!(session.index().map(|i| i.len()), Some(1));
    }
}
