// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the backup command.

use clap::{Args, Subcommand};

use crate::core::variable::Scope;

/// Arguments for the backup command.
#[derive(Debug, Clone, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

/// Backup subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum BackupCommand {
    /// Snapshots one or both scopes to a JSON file.
    Create {
        /// Human-readable backup name.
        #[arg(short, long)]
        name: Option<String>,

        /// Free-form description.
        #[arg(short, long)]
        description: Option<String>,

        /// Restrict the snapshot to one scope; both when omitted.
        #[arg(short, long, value_name = "SCOPE")]
        scope: Option<Scope>,
    },

    /// Lists stored backups, newest first.
    List,

    /// Writes a backup's variables back to the registry.
    Restore {
        /// Backup id (see `backup list`).
        id: String,

        /// Remove variables that are not in the backup.
        #[arg(long)]
        replace: bool,
    },

    /// Deletes a stored backup.
    Delete {
        /// Backup id (see `backup list`).
        id: String,
    },
}
