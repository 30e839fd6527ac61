// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::{HelipadRecord, MatchState, SceneryExtensions};
use crate::HelipadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The visible map rectangle in degrees plus the map's zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64, zoom: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            zoom,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.bottom && lat <= self.top && lon >= self.left && lon <= self.right
    }
}

/// Zoom → grid cell size in degrees. Each band is `(zoom_below, size)`; zooms past the
/// last band use `finest`. Sizes shrink as zoom grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPolicy {
    bands: Vec<(f64, f64)>,
    finest: f64,
}

/// Smallest cell size whose cell keys still fit in `i32` for any longitude.
pub const MIN_GRID_SIZE: f64 = 180.0 / i32::MAX as f64;

impl Default for GridPolicy {
    fn default() -> Self {
        Self {
            bands: vec![(5.0, 5.0), (8.0, 1.0), (12.0, 0.2)],
            finest: 0.05,
        }
    }
}

impl GridPolicy {
    pub fn new(bands: Vec<(f64, f64)>, finest: f64) -> Result<Self, HelipadError> {
        let sizes = bands.iter().map(|&(_, s)| s).chain(std::iter::once(finest));
        if sizes.clone().any(|s| !(s.is_finite() && s > 0.0)) {
            return Err(HelipadError::InvalidGridPolicy(
                "grid sizes must be positive".to_string(),
            ));
        }
        let sizes: Vec<f64> = sizes.collect();
        if sizes.iter().any(|&s| s < MIN_GRID_SIZE) {
            return Err(HelipadError::InvalidGridPolicy(format!(
                "grid sizes must be at least {:e} degrees",
                MIN_GRID_SIZE
            )));
        }
        if sizes.windows(2).any(|w| w[1] >= w[0]) {
            return Err(HelipadError::InvalidGridPolicy(
                "grid sizes must shrink as zoom increases".to_string(),
            ));
        }
        if bands.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(HelipadError::InvalidGridPolicy(
                "zoom thresholds must be ascending".to_string(),
            ));
        }
        Ok(Self { bands, finest })
    }

    pub fn grid_size(&self, zoom: f64) -> f64 {
        self.bands
            .iter()
            .find(|&&(below, _)| zoom < below)
            .map(|&(_, size)| size)
            .unwrap_or(self.finest)
    }

    /// Truncates (not rounds) toward zero, so cells straddling the equator and the
    /// prime meridian are twice as wide as the others.
    pub fn cell_for(&self, lat: f64, lon: f64, zoom: f64) -> (i32, i32) {
        let grid = self.grid_size(zoom);
        ((lon / grid) as i32, (lat / grid) as i32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderCluster {
    /// A lone helipad, drawn as an individual point coloured by its match state.
    Single {
        cell: (i32, i32),
        index: usize,
        lat: f64,
        lon: f64,
        state: MatchState,
    },
    /// Several helipads collapsed into one marker at their mean position.
    Aggregate {
        cell: (i32, i32),
        lat: f64,
        lon: f64,
        count: usize,
        members: Vec<usize>,
    },
}

impl RenderCluster {
    pub fn cell(&self) -> (i32, i32) {
        match self {
            RenderCluster::Single { cell, .. } | RenderCluster::Aggregate { cell, .. } => *cell,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            RenderCluster::Single { lat, lon, .. } | RenderCluster::Aggregate { lat, lon, .. } => {
                (*lat, *lon)
            }
        }
    }

    pub fn count(&self) -> usize {
        match self {
            RenderCluster::Single { .. } => 1,
            RenderCluster::Aggregate { count, .. } => *count,
        }
    }

    /// Indices into the record slice the clusters were computed from.
    pub fn members(&self) -> Vec<usize> {
        match self {
            RenderCluster::Single { index, .. } => vec![*index],
            RenderCluster::Aggregate { members, .. } => members.clone(),
        }
    }
}

/// Buckets the helipads visible in `viewport` into grid cells sized for its zoom.
/// Output is ordered by cell key.
pub fn cluster_viewport(
    records: &[HelipadRecord],
    viewport: &Viewport,
    policy: &GridPolicy,
    exts: &SceneryExtensions,
) -> Vec<RenderCluster> {
    let mut cells: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();
    for (i, r) in records.iter().enumerate() {
        if viewport.contains(r.lat, r.lon) {
            cells
                .entry(policy.cell_for(r.lat, r.lon, viewport.zoom))
                .or_default()
                .push(i);
        }
    }

    log::debug!(
        "Clustered viewport — zoom={} grid={} cells={}",
        viewport.zoom,
        policy.grid_size(viewport.zoom),
        cells.len()
    );

    cells
        .into_iter()
        .map(|(cell, members)| {
            if let [index] = members[..] {
                let r = &records[index];
                return RenderCluster::Single {
                    cell,
                    index,
                    lat: r.lat,
                    lon: r.lon,
                    state: r.match_state(exts),
                };
            }
            let n = members.len() as f64;
            let lat = members.iter().map(|&i| records[i].lat).sum::<f64>() / n;
            let lon = members.iter().map(|&i| records[i].lon).sum::<f64>() / n;
            RenderCluster::Aggregate {
                cell,
                lat,
                lon,
                count: members.len(),
                members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pad_at(ident: &str, lat: f64, lon: f64) -> HelipadRecord {
        HelipadRecord {
            kind: "Other".to_string(),
            name: ident.to_string(),
            ident: ident.to_string(),
            lat,
            lon,
            elevation_m: 0.0,
            mag_var: 0.0,
            tags: String::new(),
            description: String::new(),
            scenery_path: None,
        }
    }

    #[test]
    fn test_default_grid_bands() {
        let policy = GridPolicy::default();
        assert_eq!(policy.grid_size(0.0), 5.0);
        assert_eq!(policy.grid_size(4.9), 5.0);
        assert_eq!(policy.grid_size(5.0), 1.0);
        assert_eq!(policy.grid_size(7.5), 1.0);
        assert_eq!(policy.grid_size(8.0), 0.2);
        assert_eq!(policy.grid_size(11.99), 0.2);
        assert_eq!(policy.grid_size(12.0), 0.05);
        assert_eq!(policy.grid_size(19.0), 0.05);
    }

    #[test]
    fn test_grid_size_is_monotonic() {
        let policy = GridPolicy::default();
        let mut last = f64::INFINITY;
        for step in 0..=40 {
            let size = policy.grid_size(step as f64 * 0.5);
            assert!(size <= last, "grid must not get coarser as zoom grows");
            last = size;
        }
    }

    #[test]
    fn test_policy_validation() {
        assert!(GridPolicy::new(vec![(4.0, 2.0), (9.0, 0.5)], 0.1).is_ok());
        assert!(GridPolicy::new(vec![(4.0, 2.0), (9.0, 3.0)], 0.1).is_err());
        assert!(GridPolicy::new(vec![(9.0, 2.0), (4.0, 0.5)], 0.1).is_err());
        assert!(GridPolicy::new(vec![(4.0, 2.0)], 0.0).is_err());
        assert!(GridPolicy::new(Vec::new(), 0.5).is_ok());
    }

    #[test]
    fn test_policy_rejects_cells_too_small_for_keys() {
        let err = GridPolicy::new(Vec::new(), 1e-9).unwrap_err();
        assert!(matches!(err, HelipadError::InvalidGridPolicy(_)));
        assert!(GridPolicy::new(vec![(4.0, 1.0)], 1e-12).is_err());

        // The floor itself keeps the extreme longitude within i32
        let policy = GridPolicy::new(Vec::new(), MIN_GRID_SIZE).unwrap();
        let (x, _) = policy.cell_for(0.0, 179.999, 20.0);
        assert!(x < i32::MAX);
        let (x, _) = policy.cell_for(0.0, -179.999, 20.0);
        assert!(x > i32::MIN);
    }

    #[test]
    fn test_cell_truncates_toward_zero() {
        let policy = GridPolicy::default();
        // zoom 10 → 0.2°
        assert_eq!(policy.cell_for(-27.47, 153.03, 10.0), (765, -137));
        assert_eq!(policy.cell_for(0.1, -0.1, 10.0), (0, 0));
        assert_eq!(policy.cell_for(-0.1, 0.1, 10.0), (0, 0));
    }

    #[test]
    fn test_single_and_aggregate() {
        let exts = SceneryExtensions::default();
        let records = vec![
            pad_at("A", -27.45, 153.05),
            pad_at("B", -27.55, 153.15),
            pad_at("C", 10.1, 10.1)
                .with_scenery_path(Some(PathBuf::from("/c/SCENERY_OBJ_C.OFF"))),
            pad_at("OUT", 50.0, 10.0),
        ];
        let viewport = Viewport::new(20.0, -30.0, 0.0, 160.0, 10.0);
        let clusters = cluster_viewport(&records, &viewport, &GridPolicy::default(), &exts);

        assert_eq!(clusters.len(), 2);
        // Ordered by cell key: (50, 50) sorts before (765, -137)
        match &clusters[0] {
            RenderCluster::Single { index, state, .. } => {
                assert_eq!(*index, 2);
                assert_eq!(*state, MatchState::Inactive);
            }
            other => panic!("expected single, got {other:?}"),
        }
        match &clusters[1] {
            RenderCluster::Aggregate {
                count,
                lat,
                lon,
                members,
                ..
            } => {
                assert_eq!(*count, 2);
                assert_eq!(members, &vec![0, 1]);
                assert!((lat - -27.5).abs() < 1e-9);
                assert!((lon - 153.1).abs() < 1e-9);
            }
            other => panic!("expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_inclusive_bounds_and_empty() {
        let exts = SceneryExtensions::default();
        let policy = GridPolicy::default();
        let records = vec![pad_at("EDGE", 10.0, 20.0)];

        let on_edge = Viewport::new(10.0, 0.0, 20.0, 30.0, 3.0);
        assert_eq!(cluster_viewport(&records, &on_edge, &policy, &exts).len(), 1);

        let elsewhere = Viewport::new(-10.0, -20.0, 20.0, 30.0, 3.0);
        assert!(cluster_viewport(&records, &elsewhere, &policy, &exts).is_empty());
        assert!(cluster_viewport(&[], &on_edge, &policy, &exts).is_empty());
    }
}
