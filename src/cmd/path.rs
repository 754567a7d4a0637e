// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! PATH maintenance command handler.

use crate::cli::path::{PathArgs, PathCommand};
use crate::cmd::{build_manager, confirm_warnings, find_variable, open_store};
use crate::config::Config;
use crate::core::manager::VariableManager;
use crate::core::pathlist::{PathEntry, PathList, PathStatus, normalize_path};
use crate::core::validator;
use crate::core::variable::{Scope, Variable};
use crate::error::Result;

const PATH_NAME: &str = "PATH";

/// Main handler for the path command.
///
/// # Errors
///
/// Returns validation, permission, and store errors unchanged, or an
/// abort when warnings are raised without `--yes`.
pub fn run_path_command(args: &PathArgs, config: &Config, yes: bool) -> Result<()> {
    let manager = build_manager(config, open_store(config));
    let engine = PathList::new();

    let existing = find_variable(&manager, PATH_NAME, args.scope)?;
    let current = existing.as_ref().map(Variable::value).unwrap_or_default();
    let entries = engine.parse(current);

    match &args.command {
        PathCommand::Show => {
            print_entries(&entries);
            for problem in PathList::validate(&entries) {
                println!("problem: {problem}");
            }
            Ok(())
        }
        PathCommand::Stats => {
            print_stats(&entries);
            Ok(())
        }
        PathCommand::Add { dir, prepend } => {
            let normalized = normalize_path(dir);
            if normalized.is_empty() {
                return Err(anyhow::anyhow!("'{dir}' does not name a directory"));
            }
            if entries
                .iter()
                .any(|e| e.normalized.eq_ignore_ascii_case(&normalized))
            {
                return Err(anyhow::anyhow!("'{normalized}' is already on PATH"));
            }

            let mut paths: Vec<String> =
                entries.iter().map(|e| e.normalized.clone()).collect();
            if *prepend {
                paths.insert(0, normalized.clone());
            } else {
                paths.push(normalized.clone());
            }
            persist(&manager, existing, args.scope, &join(&paths), yes)?;
            println!("added {normalized}");
            Ok(())
        }
        PathCommand::Remove { dir } => {
            let normalized = normalize_path(dir);
            let paths: Vec<String> = entries
                .iter()
                .map(|e| e.normalized.clone())
                .filter(|p| !p.eq_ignore_ascii_case(&normalized))
                .collect();
            if paths.len() == entries.len() {
                return Err(anyhow::anyhow!("'{normalized}' is not on PATH"));
            }
            persist(&manager, existing, args.scope, &join(&paths), yes)?;
            println!("removed {normalized}");
            Ok(())
        }
        PathCommand::Dedupe => {
            let kept = engine.dedupe(&entries);
            let dropped = entries.len() - kept.len();
            persist(&manager, existing, args.scope, &PathList::build(&kept), yes)?;
            println!("removed {dropped} duplicate(s), {} entries left", kept.len());
            Ok(())
        }
        PathCommand::Clean => {
            let kept = PathList::prune_invalid(&entries);
            let dropped = entries.len() - kept.len();
            persist(&manager, existing, args.scope, &PathList::build(&kept), yes)?;
            println!("removed {dropped} dead entr(ies), {} entries left", kept.len());
            Ok(())
        }
        PathCommand::Optimize => {
            let kept = engine.optimize(&entries);
            let dropped = entries.len() - kept.len();
            persist(&manager, existing, args.scope, &PathList::build(&kept), yes)?;
            println!(
                "optimized: {dropped} entr(ies) removed, {} entries reordered",
                kept.len()
            );
            Ok(())
        }
    }
}

fn join(paths: &[String]) -> String {
    paths.join(";")
}

/// Writes the new PATH value through the manager, warnings first.
fn persist(
    manager: &VariableManager,
    existing: Option<Variable>,
    scope: Scope,
    value: &str,
    yes: bool,
) -> Result<()> {
    let pending = existing.clone().map_or_else(
        || Variable::new(PATH_NAME, value, scope),
        |mut var| {
            var.set_value(value);
            var
        },
    );

    let warnings = validator::validate_change(&pending, scope == Scope::Machine)?;
    confirm_warnings(&warnings, yes)?;

    if existing.is_some() {
        manager.update(&pending)?;
    } else {
        manager.create(PATH_NAME, value, scope)?;
    }
    Ok(())
}

fn print_entries(entries: &[PathEntry]) {
    for entry in entries {
        let marker = match entry.status {
            PathStatus::Valid => "ok       ",
            PathStatus::Invalid => "invalid  ",
            PathStatus::Duplicate => "duplicate",
            PathStatus::TooLong => "too long ",
        };
        println!("{marker}  {}", entry.normalized);
    }
}

fn print_stats(entries: &[PathEntry]) {
    let stats = PathList::statistics(entries);
    println!("entries:      {}", stats.total);
    println!("valid:        {}", stats.valid);
    println!("invalid:      {}", stats.invalid);
    println!("duplicate:    {}", stats.duplicate);
    println!("too long:     {}", stats.too_long);
    println!("existing:     {}", stats.existing);
    println!("missing:      {}", stats.missing);
    println!("total length: {}", stats.total_length);
}
