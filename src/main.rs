// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   List | Get | Set | Delete | Search | Path | Backup
//! ```

use std::process::ExitCode;

use envman_rs::cli::global::GlobalOptions;
use envman_rs::cli::{self, Command};
use envman_rs::cmd::backup::run_backup_command;
use envman_rs::cmd::env::{
    run_delete_command, run_get_command, run_list_command, run_search_command, run_set_command,
};
use envman_rs::cmd::path::run_path_command;
use envman_rs::config::Config;
use envman_rs::logging::{LogConfig, LogLevel, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::List(args)) => {
            load_config(&cli.global).and_then(|config| run_list_command(args, &config))
        }
        Some(Command::Get(args)) => {
            load_config(&cli.global).and_then(|config| run_get_command(args, &config))
        }
        Some(Command::Set(args)) => load_config(&cli.global)
            .and_then(|config| run_set_command(args, &config, cli.global.yes)),
        Some(Command::Delete(args)) => {
            load_config(&cli.global).and_then(|config| run_delete_command(args, &config))
        }
        Some(Command::Search(args)) => {
            load_config(&cli.global).and_then(|config| run_search_command(args, &config))
        }
        Some(Command::Path(args)) => load_config(&cli.global)
            .and_then(|config| run_path_command(args, &config, cli.global.yes)),
        Some(Command::Backup(args)) => {
            load_config(&cli.global).and_then(|config| run_backup_command(args, &config))
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn load_config(global: &GlobalOptions) -> envman_rs::error::Result<Config> {
    let mut loader = Config::builder().add_toml_file_optional("envman.toml");
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix("ENVMAN").build().map_err(|e| {
        eprintln!("Failed to load config: {e}");
        e
    })
}
