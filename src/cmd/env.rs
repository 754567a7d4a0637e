// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Variable command handlers.

use crate::cli::env::{DeleteArgs, GetArgs, ListArgs, SearchArgs, SetArgs};
use crate::cmd::{build_manager, confirm_warnings, find_variable, open_store};
use crate::config::Config;
use crate::core::validator;
use crate::core::variable::{Scope, Variable};
use crate::error::Result;

/// Main handler for the list command.
///
/// # Errors
///
/// Returns an error if a scope cannot be read.
pub fn run_list_command(args: &ListArgs, config: &Config) -> Result<()> {
    let manager = build_manager(config, open_store(config));

    let scopes: &[Scope] = match args.scope {
        Some(ref scope) => std::slice::from_ref(scope),
        None => &Scope::ALL,
    };
    for &scope in scopes {
        let vars = manager.get_by_scope(scope)?;
        println!("[{scope}] ({} variables)", vars.len());
        for var in &vars {
            println!("{}={}", var.name(), var.value());
        }
    }
    Ok(())
}

/// Main handler for the get command.
///
/// # Errors
///
/// Returns an error if the variable is not found or a scope cannot be read.
pub fn run_get_command(args: &GetArgs, config: &Config) -> Result<()> {
    let manager = build_manager(config, open_store(config));

    // Unscoped lookups prefer the user scope, as the shell does.
    const USER_FIRST: [Scope; 2] = [Scope::User, Scope::Machine];
    let scopes: &[Scope] = match args.scope {
        Some(ref scope) => std::slice::from_ref(scope),
        None => &USER_FIRST,
    };
    for &scope in scopes {
        if let Some(var) = find_variable(&manager, &args.name, scope)? {
            println!("{}", var.value());
            return Ok(());
        }
    }
    Err(anyhow::anyhow!("variable '{}' not found", args.name))
}

/// Main handler for the set command: updates an existing variable or
/// creates a new one.
///
/// # Errors
///
/// Returns validation, permission, and store errors unchanged, or an
/// abort when warnings are raised without `--yes`.
pub fn run_set_command(args: &SetArgs, config: &Config, yes: bool) -> Result<()> {
    let manager = build_manager(config, open_store(config));

    let existing = find_variable(&manager, &args.name, args.scope)?;
    let pending = existing.clone().map_or_else(
        || Variable::new(args.name.trim(), &args.value, args.scope),
        |mut var| {
            var.set_value(&args.value);
            var
        },
    );

    let warnings = validator::validate_change(&pending, args.scope == Scope::Machine)?;
    confirm_warnings(&warnings, yes)?;

    if existing.is_some() {
        manager.update(&pending)?;
        println!("updated {} ({})", pending.name(), args.scope);
    } else {
        manager.create(&args.name, &args.value, args.scope)?;
        println!("created {} ({})", args.name.trim(), args.scope);
    }
    Ok(())
}

/// Main handler for the delete command. Deleting a missing variable is a
/// no-op success.
///
/// # Errors
///
/// Returns validation, permission, and store errors unchanged.
pub fn run_delete_command(args: &DeleteArgs, config: &Config) -> Result<()> {
    let manager = build_manager(config, open_store(config));

    let variable = find_variable(&manager, &args.name, args.scope)?
        .unwrap_or_else(|| Variable::new(args.name.trim(), "", args.scope));
    manager.delete(&variable)?;
    println!("deleted {} ({})", variable.name(), args.scope);
    Ok(())
}

/// Main handler for the search command.
///
/// # Errors
///
/// Returns an error if a scope cannot be read.
pub fn run_search_command(args: &SearchArgs, config: &Config) -> Result<()> {
    let manager = build_manager(config, open_store(config));

    let matches = manager.search(
        &args.query,
        !args.value_only,
        !args.name_only,
        args.case_sensitive,
    )?;
    for var in &matches {
        println!("[{}] {}={}", var.scope(), var.name(), var.value());
    }
    println!("{} match(es)", matches.len());
    Ok(())
}
