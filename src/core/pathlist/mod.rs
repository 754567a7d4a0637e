// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Delimited path-list engine.
//!
//! ```text
//! parse("C:\A;C:\a;<bad>")
//!   normalize: trim, strip quotes, / -> \, drop trailing \ (keep root)
//!   classify left-to-right, case-insensitive:
//!     seen before        -> Duplicate (wins over TooLong/Invalid)
//!     > 260 chars        -> TooLong
//!     bad char / missing -> Invalid
//!     otherwise          -> Valid
//!
//! build     join normalized with ';'
//! dedupe    keep first per path, re-classify survivor alone
//! prune     keep Valid + Duplicate
//! optimize  dedupe -> prune -> sort (existing first, then a-z)
//!
//! PathProbe seam: FsProbe in production, FixedProbe in tests
//! ```

use std::collections::HashSet;
use std::path::Path;

/// Delimiter joining list elements.
pub const PATH_SEPARATOR: char = ';';

/// Maximum length of a single list element, in characters.
pub const MAX_SINGLE_PATH_LENGTH: usize = 260;

/// Maximum length of the joined list value, in characters.
pub const MAX_TOTAL_PATH_LENGTH: usize = 32767;

/// Characters that cannot appear in a path element.
pub const FORBIDDEN_PATH_CHARS: [char; 6] = ['<', '>', '|', '*', '?', '"'];

/// Health of a single list element, relative to its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// First occurrence, within limits, resolvable.
    Valid,
    /// Forbidden character or unresolvable path.
    Invalid,
    /// Case-insensitive repeat of an earlier element.
    Duplicate,
    /// Exceeds the per-element length limit.
    TooLong,
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::TooLong => write!(f, "too long"),
        }
    }
}

/// One element of a delimited list value.
///
/// Status is computed by the engine, never set by callers; it is
/// list-relative and recomputed whenever membership or order changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// The segment as found in the delimited string.
    pub raw: String,
    /// Normalized form used for comparison and rebuilding.
    pub normalized: String,
    pub status: PathStatus,
    pub exists: bool,
    pub is_directory: bool,
}

/// Filesystem lookup seam. Keeps the engine testable without touching disk.
pub trait PathProbe: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn is_directory(&self, path: &str) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_directory(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }
}

/// Probe answering from a fixed, case-insensitive set of directories.
#[derive(Debug, Clone, Default)]
pub struct FixedProbe {
    dirs: HashSet<String>,
}

impl FixedProbe {
    /// Creates a probe that resolves exactly the given directories.
    #[must_use]
    pub fn with_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(|d| d.into().to_lowercase()).collect(),
        }
    }
}

impl PathProbe for FixedProbe {
    fn exists(&self, path: &str) -> bool {
        self.dirs.contains(&path.to_lowercase())
    }

    fn is_directory(&self, path: &str) -> bool {
        self.exists(path)
    }
}

/// Normalizes a raw segment: trims whitespace, strips one pair of
/// surrounding double quotes, unifies `/` to `\`, and drops a trailing
/// backslash except on a drive root like `C:\`.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let mut path = raw.trim();
    if path.len() >= 2 && path.starts_with('"') && path.ends_with('"') {
        path = &path[1..path.len() - 1];
    }
    let mut path = path.replace('/', "\\");
    while path.chars().count() > 3 && path.ends_with('\\') {
        path.pop();
    }
    path
}

/// First forbidden character in a normalized path, if any.
fn forbidden_char(path: &str) -> Option<char> {
    path.chars().find(|c| FORBIDDEN_PATH_CHARS.contains(c))
}

/// Aggregate health counters for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathStatistics {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub duplicate: usize,
    pub too_long: usize,
    pub existing: usize,
    pub missing: usize,
    /// Length of the rebuilt, joined value.
    pub total_length: usize,
}

/// The path-list engine. Stateless apart from the injected probe.
pub struct PathList {
    probe: Box<dyn PathProbe>,
}

impl Default for PathList {
    fn default() -> Self {
        Self::new()
    }
}

impl PathList {
    /// Engine over the real filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(Box::new(FsProbe))
    }

    /// Engine over a custom probe.
    #[must_use]
    pub fn with_probe(probe: Box<dyn PathProbe>) -> Self {
        Self { probe }
    }

    /// Splits a delimited value into classified entries.
    ///
    /// Empty segments are dropped. Classification is a single
    /// left-to-right pass: a case-insensitive repeat of an already-seen
    /// normalized path is `Duplicate` regardless of its own validity;
    /// otherwise the entry is `TooLong`, `Invalid`, or `Valid` on its own
    /// merits.
    #[must_use]
    pub fn parse(&self, value: &str) -> Vec<PathEntry> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for segment in value.split(PATH_SEPARATOR) {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                continue;
            }
            let normalized = normalize_path(trimmed);
            if normalized.is_empty() {
                continue;
            }

            let key = normalized.to_lowercase();
            let entry = if seen.contains(&key) {
                let exists = self.probe.exists(&normalized);
                PathEntry {
                    raw: trimmed.to_string(),
                    is_directory: exists && self.probe.is_directory(&normalized),
                    exists,
                    status: PathStatus::Duplicate,
                    normalized,
                }
            } else {
                seen.insert(key);
                self.classify_alone(trimmed, normalized)
            };
            entries.push(entry);
        }

        entries
    }

    /// Classifies one segment as if it were the only element.
    fn classify_alone(&self, raw: &str, normalized: String) -> PathEntry {
        let exists = self.probe.exists(&normalized);
        let is_directory = exists && self.probe.is_directory(&normalized);

        let status = if normalized.chars().count() > MAX_SINGLE_PATH_LENGTH {
            PathStatus::TooLong
        } else if forbidden_char(&normalized).is_some() || !exists {
            PathStatus::Invalid
        } else {
            PathStatus::Valid
        };

        PathEntry {
            raw: raw.to_string(),
            normalized,
            status,
            exists,
            is_directory,
        }
    }

    /// Joins entries back into a delimited value, skipping empty paths.
    #[must_use]
    pub fn build(entries: &[PathEntry]) -> String {
        let paths: Vec<&str> = entries
            .iter()
            .map(|e| e.normalized.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        paths.join(&PATH_SEPARATOR.to_string())
    }

    /// Human-readable problem descriptions, one per problem class.
    #[must_use]
    pub fn validate(entries: &[PathEntry]) -> Vec<String> {
        let mut problems = Vec::new();
        let stats = Self::statistics(entries);

        if stats.total_length > MAX_TOTAL_PATH_LENGTH {
            problems.push(format!(
                "total length {} exceeds the {MAX_TOTAL_PATH_LENGTH}-character limit",
                stats.total_length
            ));
        }
        if stats.invalid > 0 {
            problems.push(format!("{} unresolvable or malformed entries", stats.invalid));
        }
        if stats.duplicate > 0 {
            problems.push(format!("{} duplicate entries", stats.duplicate));
        }
        if stats.too_long > 0 {
            problems.push(format!(
                "{} entries exceed {MAX_SINGLE_PATH_LENGTH} characters",
                stats.too_long
            ));
        }

        problems
    }

    /// Keeps the first occurrence per case-insensitive normalized path.
    ///
    /// The surviving entry is re-classified as if it were alone, so a kept
    /// entry previously marked `Duplicate` becomes `Valid`, `Invalid`, or
    /// `TooLong` on its own merits.
    #[must_use]
    pub fn dedupe(&self, entries: &[PathEntry]) -> Vec<PathEntry> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut kept = Vec::new();

        for entry in entries {
            let key = entry.normalized.to_lowercase();
            if seen.insert(key) {
                kept.push(self.classify_alone(&entry.raw, entry.normalized.clone()));
            }
        }

        kept
    }

    /// Retains `Valid` and `Duplicate` entries, dropping the rest.
    #[must_use]
    pub fn prune_invalid(entries: &[PathEntry]) -> Vec<PathEntry> {
        entries
            .iter()
            .filter(|e| matches!(e.status, PathStatus::Valid | PathStatus::Duplicate))
            .cloned()
            .collect()
    }

    /// `dedupe`, then `prune_invalid`, then a stable existence-first sort:
    /// existing paths before missing ones, ties broken case-insensitively.
    #[must_use]
    pub fn optimize(&self, entries: &[PathEntry]) -> Vec<PathEntry> {
        let mut result = Self::prune_invalid(&self.dedupe(entries));
        result.sort_by(|a, b| {
            (!a.exists, a.normalized.to_lowercase()).cmp(&(!b.exists, b.normalized.to_lowercase()))
        });
        result
    }

    /// Aggregate counters over a list.
    #[must_use]
    pub fn statistics(entries: &[PathEntry]) -> PathStatistics {
        let mut stats = PathStatistics {
            total: entries.len(),
            total_length: Self::build(entries).chars().count(),
            ..PathStatistics::default()
        };

        for entry in entries {
            match entry.status {
                PathStatus::Valid => stats.valid += 1,
                PathStatus::Invalid => stats.invalid += 1,
                PathStatus::Duplicate => stats.duplicate += 1,
                PathStatus::TooLong => stats.too_long += 1,
            }
            if entry.exists {
                stats.existing += 1;
            } else {
                stats.missing += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests;
