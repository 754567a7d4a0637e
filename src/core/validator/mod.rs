// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pure validation rules. No I/O anywhere in this module.
//!
//! ```text
//! validate_name      grammar ^[A-Za-z_][A-Za-z0-9_]*$
//!                    len <= 255, no < > | & ^ " % =, not reserved
//! validate_value     len <= 32767, list-valued: per-entry structure
//! validate_variable  name + value
//! validate_change    + advisory warnings (watch-set, list health)
//! validate_batch     identity dedup, member rules, size warning
//!
//! errors are hard failures; warnings never block
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::core::pathlist::{
    FORBIDDEN_PATH_CHARS, MAX_SINGLE_PATH_LENGTH, PATH_SEPARATOR, normalize_path,
};
use crate::core::variable::Variable;
use crate::error::ValidationError;

/// Maximum variable name length, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum variable value length, in characters.
pub const MAX_VALUE_LENGTH: usize = 32767;

/// Names the OS depends on; creation, modification, and deletion refused.
pub const RESERVED_NAMES: [&str; 11] = [
    "COMPUTERNAME",
    "COMSPEC",
    "NUMBER_OF_PROCESSORS",
    "OS",
    "PROCESSOR_ARCHITECTURE",
    "PROCESSOR_IDENTIFIER",
    "PROCESSOR_LEVEL",
    "PROCESSOR_REVISION",
    "SYSTEMDRIVE",
    "SYSTEMROOT",
    "WINDIR",
];

/// Watch-set of editable but OS-critical names; changes warn.
pub const IMPORTANT_VARIABLES: [&str; 9] = [
    "PATH",
    "PATHEXT",
    "TEMP",
    "TMP",
    "USERPROFILE",
    "APPDATA",
    "PROGRAMFILES",
    "HOMEDRIVE",
    "HOMEPATH",
];

/// Names whose values are delimiter-joined path lists.
const LIST_VALUED_NAMES: [&str; 3] = ["PATH", "PYTHONPATH", "CLASSPATH"];

/// Characters forbidden in variable names beyond the grammar.
const FORBIDDEN_NAME_CHARS: [char; 7] = ['<', '>', '|', '&', '^', '"', '%'];

/// List length beyond which a change warns.
const LIST_WARN_THRESHOLD: usize = 100;

/// Batch size beyond which validation warns.
const BATCH_WARN_THRESHOLD: usize = 50;

fn name_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("name grammar pattern is valid")
    })
}

/// Whether `name` is reserved by the OS, case-insensitively.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Whether `name` is in the important-variables watch-set.
#[must_use]
pub fn is_important(name: &str) -> bool {
    IMPORTANT_VARIABLES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(name))
}

/// Whether `name` identifies a delimiter-joined list value.
#[must_use]
pub fn is_list_valued(name: &str) -> bool {
    LIST_VALUED_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(name))
}

/// Validates a variable name against grammar and the reserved set.
///
/// # Errors
///
/// Returns the [`ValidationError`] naming the first rule that failed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            len,
            max: MAX_NAME_LENGTH,
        });
    }
    if name.contains('=') {
        return Err(ValidationError::EmbeddedEquals {
            name: name.to_string(),
        });
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(ValidationError::IllegalNameCharacter {
            name: name.to_string(),
            ch,
        });
    }
    if !name_grammar().is_match(name) {
        return Err(ValidationError::BadGrammar {
            name: name.to_string(),
        });
    }
    if is_reserved(name) {
        return Err(ValidationError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Validates a variable value; for list-valued names, also each element.
///
/// The empty string is a valid value.
///
/// # Errors
///
/// Returns the [`ValidationError`] naming the first rule that failed.
pub fn validate_value(name: &str, value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > MAX_VALUE_LENGTH {
        return Err(ValidationError::ValueTooLong {
            len,
            max: MAX_VALUE_LENGTH,
        });
    }
    if is_list_valued(name) {
        validate_list_structure(value)?;
    }
    Ok(())
}

/// Structural checks on a delimited list value: per-element length and
/// character set. Purely syntactic; existence is the path engine's business.
fn validate_list_structure(value: &str) -> Result<(), ValidationError> {
    for segment in value.split(PATH_SEPARATOR) {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let normalized = normalize_path(trimmed);
        let len = normalized.chars().count();
        if len > MAX_SINGLE_PATH_LENGTH {
            return Err(ValidationError::PathEntryTooLong {
                entry: normalized,
                len,
                max: MAX_SINGLE_PATH_LENGTH,
            });
        }
        if let Some(ch) = normalized.chars().find(|c| FORBIDDEN_PATH_CHARS.contains(c)) {
            return Err(ValidationError::PathEntryIllegalCharacter {
                entry: normalized,
                ch,
            });
        }
    }
    Ok(())
}

/// Validates a whole variable: name, value, and list structure.
///
/// # Errors
///
/// Returns the [`ValidationError`] naming the first rule that failed.
pub fn validate_variable(variable: &Variable) -> Result<(), ValidationError> {
    validate_name(variable.name())?;
    validate_value(variable.name(), variable.value())
}

/// Validates a pending change and collects advisory warnings.
///
/// Warnings never block; callers decide whether to proceed. They are
/// emitted when the variable is in the watch-set, or when a list value is
/// oversized, contains duplicates, or contains malformed elements.
///
/// # Errors
///
/// Returns the [`ValidationError`] naming the first hard rule that failed.
pub fn validate_change(
    variable: &Variable,
    machine_scope: bool,
) -> Result<Vec<String>, ValidationError> {
    validate_variable(variable)?;

    let mut warnings = Vec::new();
    let name = variable.name();

    if is_important(name) {
        let scope_note = if machine_scope { "machine-wide" } else { "user" };
        warnings.push(format!(
            "'{name}' is an important {scope_note} variable; applications may misbehave if it is wrong"
        ));
    }

    if is_list_valued(name) {
        let segments: Vec<String> = variable
            .value()
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize_path)
            .filter(|s| !s.is_empty())
            .collect();

        if segments.len() > LIST_WARN_THRESHOLD {
            warnings.push(format!(
                "list has {} entries, more than {LIST_WARN_THRESHOLD}; lookups may be slow",
                segments.len()
            ));
        }

        let mut seen = std::collections::HashSet::new();
        let duplicates = segments
            .iter()
            .filter(|s| !seen.insert(s.to_lowercase()))
            .count();
        if duplicates > 0 {
            warnings.push(format!("list contains {duplicates} duplicate entries"));
        }

        let malformed = segments
            .iter()
            .filter(|s| s.chars().any(|c| FORBIDDEN_PATH_CHARS.contains(&c)))
            .count();
        if malformed > 0 {
            warnings.push(format!(
                "list contains {malformed} entries that cannot resolve to a path"
            ));
        }
    }

    Ok(warnings)
}

/// Outcome of validating a batch of variables.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl BatchReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a batch: identity uniqueness first, then each member.
///
/// Duplicate `(name, scope)` identities reject the batch before member
/// validation. Batches larger than 50 warn.
#[must_use]
pub fn validate_batch(variables: &[Variable]) -> BatchReport {
    let mut report = BatchReport::default();

    let mut identities = std::collections::HashSet::new();
    for variable in variables {
        if !identities.insert(variable.identity()) {
            report.errors.push(
                ValidationError::DuplicateIdentity {
                    name: variable.name().to_string(),
                    scope: variable.scope(),
                }
                .to_string(),
            );
        }
    }
    if !report.errors.is_empty() {
        return report;
    }

    if variables.len() > BATCH_WARN_THRESHOLD {
        report.warnings.push(format!(
            "batch has {} variables, more than {BATCH_WARN_THRESHOLD}",
            variables.len()
        ));
    }

    for variable in variables {
        match validate_change(variable, variable.scope() == crate::core::variable::Scope::Machine)
        {
            Ok(warnings) => {
                for warning in warnings {
                    report.warnings.push(format!("{}: {warning}", variable.name()));
                }
            }
            Err(e) => report.errors.push(format!("{}: {e}", variable.name())),
        }
    }

    report
}
