// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup command handler.

use std::time::SystemTime;

use crate::backup::BackupManager;
use crate::cli::backup::{BackupArgs, BackupCommand};
use crate::cmd::open_store;
use crate::config::Config;
use crate::core::variable::Scope;
use crate::error::Result;

/// Main handler for the backup command.
///
/// # Errors
///
/// Returns backup, permission, and store errors unchanged; a partially
/// failed restore reports each failed scope and exits nonzero.
pub fn run_backup_command(args: &BackupArgs, config: &Config) -> Result<()> {
    let store = open_store(config);
    let backups = BackupManager::new(store, config.backup_dir()).with_keep(config.backup.keep);

    match &args.command {
        BackupCommand::Create {
            name,
            description,
            scope,
        } => {
            let scopes: Vec<Scope> = scope.map_or_else(|| Scope::ALL.to_vec(), |s| vec![s]);
            let info = backups.create(name.as_deref(), description.as_deref(), &scopes)?;
            println!(
                "created backup {} ('{}', {} variables)",
                info.id, info.name, info.variable_count
            );
            Ok(())
        }
        BackupCommand::List => {
            let infos = backups.list()?;
            if infos.is_empty() {
                println!("no backups");
                return Ok(());
            }
            for info in &infos {
                println!(
                    "{}  {}  {} variables  [{}]  {}",
                    info.id,
                    format_age(info.created_at),
                    info.variable_count,
                    info.scopes
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    info.name,
                );
            }
            Ok(())
        }
        BackupCommand::Restore { id, replace } => {
            let report = backups.restore(id, *replace)?;
            println!("restored {} variable(s)", report.restored);
            for (scope, error) in &report.failures {
                eprintln!("failed to restore {scope} scope: {error}");
            }
            if report.is_complete() {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "{} scope(s) could not be restored",
                    report.failures.len()
                ))
            }
        }
        BackupCommand::Delete { id } => {
            backups.delete(id)?;
            println!("deleted backup {id}");
            Ok(())
        }
    }
}

/// Compact "how long ago" rendering for listings.
fn format_age(at: SystemTime) -> String {
    let secs = at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86400)
    }
}
