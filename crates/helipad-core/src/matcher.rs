// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::HelipadRecord;
use crate::scenery_index::SceneryIndex;

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub records: Vec<HelipadRecord>,
    pub matched: usize,
    pub unmatched: usize,
}

/// Returns the record with its scenery path set from the index. Records whose ident is
/// not indexed come back unchanged.
pub fn match_record(record: &HelipadRecord, index: &SceneryIndex) -> HelipadRecord {
    match index.get(&record.ident) {
        Some(path) => record.with_scenery_path(Some(path.to_path_buf())),
        None => record.clone(),
    }
}

pub fn attach_matches(records: &[HelipadRecord], index: &SceneryIndex) -> MatchOutcome {
    let records: Vec<HelipadRecord> = records.iter().map(|r| match_record(r, index)).collect();
    let matched = records.iter().filter(|r| r.is_matched()).count();

    log::info!(
        "Matched helipads to scenery — matched={} unmatched={} indexed={}",
        matched,
        records.len() - matched,
        index.len()
    );

    MatchOutcome {
        unmatched: records.len() - matched,
        matched,
        records,
    }
}
