// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{EnvError, EnvResult, ManagerError, RegistryError, ValidationError};
use crate::core::variable::Scope;

#[test]
fn test_reserved_name_display() {
    let err = ValidationError::ReservedName {
        name: "WINDIR".to_string(),
    };
    insta::assert_snapshot!(err.to_string());
}

#[test]
fn test_permission_denied_display() {
    let err = RegistryError::PermissionDenied {
        scope: Scope::Machine,
    };
    insta::assert_snapshot!(err.to_string());
}

#[test]
fn test_already_exists_display() {
    let err = ManagerError::AlreadyExists {
        name: "JAVA_HOME".to_string(),
        scope: Scope::User,
    };
    insta::assert_snapshot!(err.to_string());
}

#[test]
fn test_env_error_size() {
    // EnvError should be reasonably small
    // Box<str> variants (Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<EnvError>();
    assert!(size <= 24, "EnvError is {size} bytes, expected <= 24");
}

#[test]
fn test_env_result_size() {
    let size = std::mem::size_of::<EnvResult<()>>();
    assert!(size <= 24, "EnvResult<()> is {size} bytes, expected <= 24");
}

#[test]
fn test_boxing_through_from() {
    let err: EnvError = ValidationError::EmptyName.into();
    assert!(matches!(err, EnvError::Validation(_)));

    let err: EnvError = RegistryError::Access {
        scope: Scope::User,
        message: "key vanished".to_string(),
    }
    .into();
    assert!(matches!(err, EnvError::Registry(_)));
}
