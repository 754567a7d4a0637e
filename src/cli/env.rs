// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the variable commands.

use clap::Args;

use crate::core::variable::Scope;

/// Arguments for the list command.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Restrict to one scope; both when omitted.
    #[arg(short, long, value_name = "SCOPE")]
    pub scope: Option<Scope>,
}

/// Arguments for the get command.
#[derive(Debug, Clone, Args)]
pub struct GetArgs {
    /// Variable name (case-insensitive).
    pub name: String,

    /// Restrict the lookup to one scope; user wins over machine when omitted.
    #[arg(short, long, value_name = "SCOPE")]
    pub scope: Option<Scope>,
}

/// Arguments for the set command.
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Variable name.
    pub name: String,

    /// New value.
    pub value: String,

    /// Target scope.
    #[arg(short, long, value_name = "SCOPE", default_value = "user")]
    pub scope: Scope,
}

/// Arguments for the delete command.
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Variable name.
    pub name: String,

    /// Target scope.
    #[arg(short, long, value_name = "SCOPE", default_value = "user")]
    pub scope: Scope,
}

/// Arguments for the search command.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Substring to look for; empty matches everything.
    pub query: String,

    /// Match variable names only.
    #[arg(long, conflicts_with = "value_only")]
    pub name_only: bool,

    /// Match variable values only.
    #[arg(long)]
    pub value_only: bool,

    /// Case-sensitive matching.
    #[arg(long)]
    pub case_sensitive: bool,
}
