// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the path command.

use clap::{Args, Subcommand};

use crate::core::variable::Scope;

/// Arguments for the path command.
#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    /// Scope whose PATH to operate on.
    #[arg(short, long, value_name = "SCOPE", default_value = "user")]
    pub scope: Scope,

    #[command(subcommand)]
    pub command: PathCommand,
}

/// PATH maintenance subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum PathCommand {
    /// Lists entries with their status.
    Show,

    /// Appends a directory (or prepends with --prepend).
    Add {
        /// Directory to add.
        dir: String,

        /// Put the directory first instead of last.
        #[arg(long)]
        prepend: bool,
    },

    /// Removes a directory.
    Remove {
        /// Directory to remove (matched case-insensitively, normalized).
        dir: String,
    },

    /// Drops duplicate entries, keeping the first occurrence.
    Dedupe,

    /// Drops unresolvable and over-long entries.
    Clean,

    /// Dedupes, cleans, and sorts existing entries first.
    Optimize,

    /// Prints health counters without changing anything.
    Stats,
}
