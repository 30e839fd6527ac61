// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use helipad_core::matcher::attach_matches;
use helipad_core::toggler::{toggle, ToggleAction};
use helipad_core::{CsvLoader, HelipadError, MatchState, SceneryExtensions, SceneryIndex};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

#[test]
fn test_record_toggle_round_trip() {
    let dir = tempdir().unwrap();
    let pack = dir.path().join("helipads-au");
    fs::create_dir_all(&pack).unwrap();
    let bgl = pack.join("SCENERY_OBJ_YRBH.bgl");
    fs::write(&bgl, "payload").unwrap();

    let exts = SceneryExtensions::default();
    let index = SceneryIndex::build(dir.path(), &exts).unwrap();
    let report = CsvLoader::parse(Cursor::new(
        "Location,Royal Brisbane,YRBH,-27.448,153.028,45,11.2,hospital\n",
    ))
    .unwrap();
    let record = attach_matches(&report.records, &index).records.remove(0);
    assert_eq!(record.match_state(&exts), MatchState::Active);

    let (disabled, outcome) = record.toggled(&exts).unwrap();
    assert_eq!(outcome.action, ToggleAction::Disabled);
    assert_eq!(disabled.match_state(&exts), MatchState::Inactive);
    // The input record still describes the pre-toggle state
    assert_eq!(record.scenery_path.as_deref(), Some(bgl.as_path()));

    let (restored, outcome) = disabled.toggled(&exts).unwrap();
    assert_eq!(outcome.action, ToggleAction::Restored);
    assert_eq!(restored, record);
    assert_eq!(fs::read_to_string(&bgl).unwrap(), "payload");
}

#[test]
fn test_toggle_preserves_base_name_case() {
    let dir = tempdir().unwrap();
    let off = dir.path().join("Scenery_Obj_mixed_HX1.off");
    fs::write(&off, "").unwrap();

    let outcome = toggle(&off, &SceneryExtensions::default()).unwrap();
    assert_eq!(outcome.new_path, dir.path().join("Scenery_Obj_mixed_HX1.bgl"));
    assert_eq!(outcome.message, "Restored: Scenery_Obj_mixed_HX1.bgl");
}

#[test]
fn test_no_extension_is_unsupported() {
    let dir = tempdir().unwrap();
    let bare = dir.path().join("SCENERY_OBJ_HX2");
    fs::write(&bare, "").unwrap();

    let err = toggle(&bare, &SceneryExtensions::default()).unwrap_err();
    assert!(matches!(err, HelipadError::UnsupportedFormat(_)));
    assert!(bare.exists());
}
