// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the path-list engine.

use super::{FixedProbe, PathList, PathStatus, normalize_path};

fn engine_with(dirs: &[&str]) -> PathList {
    PathList::with_probe(Box::new(FixedProbe::with_dirs(dirs.iter().copied())))
}

#[test]
fn test_normalize_path_rules() {
    assert_eq!(normalize_path("  C:\\Tools  "), r"C:\Tools");
    assert_eq!(normalize_path("\"C:\\Program Files\\App\""), r"C:\Program Files\App");
    assert_eq!(normalize_path("C:/Tools/bin"), r"C:\Tools\bin");
    assert_eq!(normalize_path(r"C:\Tools\"), r"C:\Tools");
    // A drive root keeps its backslash.
    assert_eq!(normalize_path(r"C:\"), r"C:\");
    assert_eq!(normalize_path("C:/"), r"C:\");
    assert_eq!(normalize_path(""), "");
}

#[test]
fn test_parse_classifies_in_one_pass() {
    let engine = engine_with(&[r"C:\A", r"C:\B"]);
    let entries = engine.parse(r"C:\A;C:\a;C:\B;<invalid>");

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].status, PathStatus::Valid);
    // Case-insensitive repeat of C:\A.
    assert_eq!(entries[1].status, PathStatus::Duplicate);
    assert_eq!(entries[2].status, PathStatus::Valid);
    assert_eq!(entries[3].status, PathStatus::Invalid);

    let stats = PathList::statistics(&entries);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.duplicate, 1);
    assert_eq!(stats.valid, 2);
    assert_eq!(stats.invalid, 1);
}

#[test]
fn test_parse_drops_empty_segments() {
    let engine = engine_with(&[r"C:\A", r"C:\B"]);
    let entries = engine.parse(r";C:\A;;C:\B;");
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_missing_path_is_invalid() {
    let engine = engine_with(&[]);
    let entries = engine.parse(r"C:\nowhere");
    assert_eq!(entries[0].status, PathStatus::Invalid);
    assert!(!entries[0].exists);
}

#[test]
fn test_too_long_entry() {
    let engine = engine_with(&[]);
    let long = format!(r"C:\{}", "x".repeat(300));
    let entries = engine.parse(&long);
    assert_eq!(entries[0].status, PathStatus::TooLong);
}

#[test]
fn test_duplicate_wins_over_too_long() {
    let engine = engine_with(&[]);
    let long = format!(r"C:\{}", "x".repeat(300));
    let entries = engine.parse(&format!("{long};{long}"));

    assert_eq!(entries[0].status, PathStatus::TooLong);
    // The repeat is reported as a duplicate, not double-reported as too long.
    assert_eq!(entries[1].status, PathStatus::Duplicate);
}

#[test]
fn test_duplicate_wins_over_invalid() {
    let engine = engine_with(&[]);
    let entries = engine.parse("<bad>;<bad>");

    assert_eq!(entries[0].status, PathStatus::Invalid);
    assert_eq!(entries[1].status, PathStatus::Duplicate);
}

#[test]
fn test_build_parse_roundtrip_is_idempotent() {
    let engine = engine_with(&[r"C:\A", r"C:\B", r"C:\C"]);
    let input = "C:/A;\"C:\\B\";C:\\C\\";

    let once = PathList::build(&engine.parse(input));
    assert_eq!(once, r"C:\A;C:\B;C:\C");

    let twice = PathList::build(&engine.parse(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_dedupe_keeps_first_and_reclassifies() {
    let engine = engine_with(&[r"C:\A", r"C:\B"]);
    let entries = engine.parse(r"C:\A;C:\B;C:\a;C:\b");

    let deduped = engine.dedupe(&entries);
    assert_eq!(deduped.len(), 2);
    assert!(deduped.len() <= entries.len());
    assert!(deduped.iter().all(|e| e.status == PathStatus::Valid));

    // No two survivors share a case-insensitive normalized path.
    let mut keys: Vec<String> = deduped.iter().map(|e| e.normalized.to_lowercase()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), deduped.len());
}

#[test]
fn test_dedupe_reclassifies_a_kept_duplicate() {
    let engine = engine_with(&[r"C:\A"]);
    let mut entries = engine.parse(r"C:\A;C:\a");
    assert_eq!(entries[1].status, PathStatus::Duplicate);

    // Caller reorders so the former duplicate comes first.
    entries.rotate_left(1);
    let deduped = engine.dedupe(&entries);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].normalized, r"C:\a");
    assert_eq!(deduped[0].status, PathStatus::Valid);
}

#[test]
fn test_prune_keeps_valid_and_duplicate() {
    let engine = engine_with(&[r"C:\A"]);
    let long = format!(r"C:\{}", "x".repeat(300));
    let entries = engine.parse(&format!(r"C:\A;C:\a;C:\missing;{long}"));

    let kept = PathList::prune_invalid(&entries);
    assert_eq!(kept.len(), 2);
    assert!(
        kept.iter()
            .all(|e| matches!(e.status, PathStatus::Valid | PathStatus::Duplicate))
    );
}

#[test]
fn test_optimize_output_is_clean_and_ordered() {
    let engine = engine_with(&[r"C:\Zebra", r"C:\apple", r"C:\Mango"]);
    let entries = engine.parse(r"C:\Zebra;C:\zebra;C:\Mango;C:\apple;<bad>");

    let optimized = engine.optimize(&entries);
    assert!(
        optimized
            .iter()
            .all(|e| !matches!(e.status, PathStatus::Invalid | PathStatus::TooLong))
    );

    // Adjacent ordering: existence first, then case-insensitive name.
    for pair in optimized.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.exists > b.exists
                || (a.exists == b.exists
                    && a.normalized.to_lowercase() <= b.normalized.to_lowercase())
        );
    }
    let names: Vec<&str> = optimized.iter().map(|e| e.normalized.as_str()).collect();
    assert_eq!(names, vec![r"C:\apple", r"C:\Mango", r"C:\Zebra"]);
}

#[test]
fn test_statistics_counts() {
    let engine = engine_with(&[r"C:\A"]);
    let entries = engine.parse(r"C:\A;C:\a;C:\missing");

    let stats = PathList::statistics(&entries);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.valid, 1);
    assert_eq!(stats.duplicate, 1);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.too_long, 0);
    assert_eq!(stats.existing, 2);
    assert_eq!(stats.missing, 1);
    assert_eq!(stats.total_length, r"C:\A;C:\a;C:\missing".len());
}

#[test]
fn test_build_skips_empty_normalized_paths() {
    let entries = vec![];
    assert_eq!(PathList::build(&entries), "");
}
