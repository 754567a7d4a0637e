// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for envman-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! envman [global options] <command>
//! list [--scope SCOPE]
//! get <NAME>
//! set <NAME> <VALUE> [--scope SCOPE]
//! delete <NAME> [--scope SCOPE]
//! search <QUERY>
//! path {show|add|remove|dedupe|clean|optimize|stats}
//! backup {create|list|restore|delete}
//! ```

pub mod backup;
pub mod env;
pub mod global;
pub mod path;


use crate::cli::backup::BackupArgs;
use crate::cli::env::{DeleteArgs, GetArgs, ListArgs, SearchArgs, SetArgs};
use crate::cli::global::GlobalOptions;
use crate::cli::path::PathArgs;
use clap::{Parser, Subcommand};

/// Windows Environment Variable Manager - Rust Port
///
/// Reads and edits machine- and user-scope environment variables through
/// the registry, keeps PATH-like list values healthy, and notifies the
/// running session of every change.
#[derive(Debug, Parser)]
#[command(
    name = "envman",
    author,
    version,
    about = "Windows Environment Variable Manager",
    long_about = "envman-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Manages Windows environment variables in both the machine\n\
                  scope (requires elevation) and the user scope. Running\n\
                  processes are notified of every change, so new terminals\n\
                  pick it up without a reboot.",
    after_help = "CONFIG FILES:\n\n\
                  envman looks for an optional `envman.toml` in the current\n\
                  directory. Additional files can be passed with --config and\n\
                  are loaded on top, later files overriding earlier ones.\n\
                  ENVMAN_* environment variables override all files."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists variables of one or both scopes.
    List(ListArgs),

    /// Prints the value of a variable.
    Get(GetArgs),

    /// Creates or updates a variable.
    Set(SetArgs),

    /// Deletes a variable.
    Delete(DeleteArgs),

    /// Searches variable names and values.
    Search(SearchArgs),

    /// Inspects and repairs the PATH list.
    Path(PathArgs),

    /// Creates, restores, and manages backups.
    Backup(BackupArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
