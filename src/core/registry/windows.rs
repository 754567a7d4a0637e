// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Windows registry store.
//!
//! ```text
//! Scope::Machine -> HKLM\SYSTEM\...\Session Manager\Environment
//! Scope::User    -> HKCU\Environment
//!
//! set:    REG_EXPAND_SZ if value contains '%', else REG_SZ
//! delete: ERROR_FILE_NOT_FOUND treated as success
//! elevation: TokenElevation query, per machine-scope mutation
//! broadcast: SendMessageTimeoutW(HWND_BROADCAST, WM_SETTINGCHANGE,
//!            "Environment", SMTO_ABORTIFHUNG, timeout)
//! ```

use std::collections::BTreeMap;

use windows::Win32::Foundation::{
    CloseHandle, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, HANDLE, LPARAM,
    WPARAM,
};
use windows::Win32::Security::{
    GetTokenInformation, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation,
};
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_EXPAND_SZ,
    REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE, RegCloseKey, RegDeleteValueW, RegEnumValueW,
    RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
use windows::Win32::UI::WindowsAndMessaging::{
    HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
};
use windows::core::PCWSTR;

use super::{ChangeNotifier, MACHINE_ENV_SUBKEY, RegistryStore, USER_ENV_SUBKEY, broadcast};
use crate::core::variable::Scope;
use crate::error::{EnvResult, NotifyError, RegistryError};

/// Default broadcast timeout in milliseconds.
pub const DEFAULT_BROADCAST_TIMEOUT_MS: u32 = 3000;

/// Maximum registry value name length, in UTF-16 units, plus terminator.
const MAX_VALUE_NAME: usize = 16384;

fn to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn access_error(scope: Scope, message: impl Into<String>) -> RegistryError {
    RegistryError::Access {
        scope,
        message: message.into(),
    }
}

const fn scope_key(scope: Scope) -> (HKEY, &'static str) {
    match scope {
        Scope::Machine => (HKEY_LOCAL_MACHINE, MACHINE_ENV_SUBKEY),
        Scope::User => (HKEY_CURRENT_USER, USER_ENV_SUBKEY),
    }
}

/// RAII wrapper closing the key handle on drop.
struct OpenKey(HKEY);

impl OpenKey {
    fn open(scope: Scope, sam: REG_SAM_FLAGS) -> EnvResult<Self> {
        let (root, subkey) = scope_key(scope);
        let subkey_w = to_utf16(subkey);
        let mut key = HKEY::default();
        // SAFETY: subkey_w outlives the call; key receives the opened handle
        let status =
            unsafe { RegOpenKeyExW(root, PCWSTR(subkey_w.as_ptr()), Some(0), sam, &mut key) };
        if status.is_err() {
            return Err(access_error(scope, format!("RegOpenKeyExW failed: {status:?}")).into());
        }
        Ok(Self(key))
    }
}

impl Drop for OpenKey {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by RegOpenKeyExW and not closed yet
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

/// Decodes a REG_SZ / REG_EXPAND_SZ byte buffer into a String.
fn decode_value(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Whether the current process token is elevated.
///
/// Queried lazily at each machine-scope mutation, never cached.
#[must_use]
pub fn is_elevated() -> bool {
    let mut token = HANDLE::default();
    // SAFETY: GetCurrentProcess returns a pseudo-handle that needs no close;
    // token is closed below after a successful open
    unsafe {
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
            return false;
        }
        let mut elevation = TOKEN_ELEVATION::default();
        let mut len = 0u32;
        let ok = GetTokenInformation(
            token,
            TokenElevation,
            Some(std::ptr::from_mut(&mut elevation).cast()),
            u32::try_from(std::mem::size_of::<TOKEN_ELEVATION>()).unwrap_or(0),
            &mut len,
        )
        .is_ok();
        let _ = CloseHandle(token);
        ok && elevation.TokenIsElevated != 0
    }
}

/// Broadcasts `WM_SETTINGCHANGE("Environment")` to the session.
#[derive(Debug, Clone, Copy)]
pub struct SettingChangeNotifier {
    timeout_ms: u32,
}

impl SettingChangeNotifier {
    #[must_use]
    pub const fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl Default for SettingChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_TIMEOUT_MS)
    }
}

impl ChangeNotifier for SettingChangeNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        let param = to_utf16("Environment");
        // SAFETY: param outlives the call; HWND_BROADCAST addresses all
        // top-level windows; SMTO_ABORTIFHUNG bounds the wait per window
        let result = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(param.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                self.timeout_ms,
                None,
            )
        };
        if result.0 == 0 {
            return Err(NotifyError::Timeout {
                timeout_ms: self.timeout_ms,
            });
        }
        Ok(())
    }
}

/// [`RegistryStore`] backed by the Windows registry.
pub struct WindowsRegistry {
    notifier: SettingChangeNotifier,
}

impl Default for WindowsRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_TIMEOUT_MS)
    }
}

impl WindowsRegistry {
    #[must_use]
    pub const fn new(broadcast_timeout_ms: u32) -> Self {
        Self {
            notifier: SettingChangeNotifier::new(broadcast_timeout_ms),
        }
    }

    fn check_elevation(scope: Scope) -> EnvResult<()> {
        if scope == Scope::Machine && !is_elevated() {
            return Err(RegistryError::PermissionDenied { scope }.into());
        }
        Ok(())
    }

    fn query_value(key: &OpenKey, scope: Scope, name: &str) -> EnvResult<Option<String>> {
        let name_w = to_utf16(name);
        let mut size = 0u32;
        // SAFETY: two-call pattern; first call only asks for the size
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(name_w.as_ptr()),
                None,
                None,
                None,
                Some(std::ptr::from_mut(&mut size)),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status.is_err() {
            return Err(access_error(scope, format!("RegQueryValueExW failed: {status:?}")).into());
        }

        let mut data = vec![0u8; size as usize];
        let mut kind = REG_VALUE_TYPE::default();
        // SAFETY: data has exactly the size reported by the first call
        let status = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(name_w.as_ptr()),
                None,
                Some(std::ptr::from_mut(&mut kind)),
                Some(data.as_mut_ptr()),
                Some(std::ptr::from_mut(&mut size)),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status.is_err() {
            return Err(access_error(scope, format!("RegQueryValueExW failed: {status:?}")).into());
        }
        if kind != REG_SZ && kind != REG_EXPAND_SZ {
            return Ok(None);
        }
        Ok(Some(decode_value(&data[..size as usize])))
    }

    fn set_value(key: &OpenKey, scope: Scope, name: &str, value: &str) -> EnvResult<()> {
        let name_w = to_utf16(name);
        let value_w = to_utf16(value);
        let bytes: Vec<u8> = value_w.iter().flat_map(|u| u.to_le_bytes()).collect();
        let kind = if value.contains('%') { REG_EXPAND_SZ } else { REG_SZ };
        // SAFETY: name_w and bytes outlive the call
        let status =
            unsafe { RegSetValueExW(key.0, PCWSTR(name_w.as_ptr()), None, kind, Some(&bytes)) };
        if status.is_err() {
            return Err(access_error(scope, format!("RegSetValueExW failed: {status:?}")).into());
        }
        Ok(())
    }
}

impl RegistryStore for WindowsRegistry {
    fn list(&self, scope: Scope) -> EnvResult<BTreeMap<String, String>> {
        let key = OpenKey::open(scope, KEY_QUERY_VALUE)?;
        let mut entries = BTreeMap::new();
        let mut index = 0u32;
        loop {
            let mut name_buf = vec![0u16; MAX_VALUE_NAME];
            let mut name_len = u32::try_from(name_buf.len()).unwrap_or(u32::MAX);
            let mut kind = REG_VALUE_TYPE::default();
            let mut data_len = 0u32;
            // SAFETY: buffers outlive the call; lengths match buffer sizes
            let status = unsafe {
                RegEnumValueW(
                    key.0,
                    index,
                    windows::core::PWSTR(name_buf.as_mut_ptr()),
                    &mut name_len,
                    None,
                    Some(std::ptr::from_mut(&mut kind)),
                    None,
                    Some(std::ptr::from_mut(&mut data_len)),
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            if status.is_err() && status != ERROR_MORE_DATA {
                return Err(access_error(scope, format!("RegEnumValueW failed: {status:?}")).into());
            }

            let name = String::from_utf16_lossy(&name_buf[..name_len as usize]);
            // Environment keys only hold string values; skip anything else.
            if (kind == REG_SZ || kind == REG_EXPAND_SZ)
                && let Some(value) = Self::query_value(&key, scope, &name)?
            {
                entries.insert(name, value);
            }
            index += 1;
        }
        Ok(entries)
    }

    fn get(&self, name: &str, scope: Scope) -> EnvResult<Option<String>> {
        let key = OpenKey::open(scope, KEY_QUERY_VALUE)?;
        Self::query_value(&key, scope, name)
    }

    fn set(&self, name: &str, value: &str, scope: Scope) -> EnvResult<()> {
        Self::check_elevation(scope)?;
        let key = OpenKey::open(scope, KEY_SET_VALUE)?;
        Self::set_value(&key, scope, name, value)?;
        broadcast(&self.notifier);
        Ok(())
    }

    fn delete(&self, name: &str, scope: Scope) -> EnvResult<()> {
        Self::check_elevation(scope)?;
        let key = OpenKey::open(scope, KEY_SET_VALUE)?;
        let name_w = to_utf16(name);
        // SAFETY: name_w outlives the call
        let status = unsafe { RegDeleteValueW(key.0, PCWSTR(name_w.as_ptr())) };
        if status == ERROR_FILE_NOT_FOUND {
            // Idempotent: deleting a missing entry is success, no broadcast.
            return Ok(());
        }
        if status.is_err() {
            return Err(access_error(scope, format!("RegDeleteValueW failed: {status:?}")).into());
        }
        broadcast(&self.notifier);
        Ok(())
    }

    fn import_scope(
        &self,
        scope: Scope,
        entries: &[(String, String)],
        replace: bool,
    ) -> EnvResult<()> {
        Self::check_elevation(scope)?;
        let key = OpenKey::open(scope, KEY_QUERY_VALUE | KEY_SET_VALUE)?;

        if replace {
            let current = self.list(scope)?;
            for name in current.keys() {
                if !entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                    let name_w = to_utf16(name);
                    // SAFETY: name_w outlives the call
                    let status = unsafe { RegDeleteValueW(key.0, PCWSTR(name_w.as_ptr())) };
                    if status.is_err() && status != ERROR_FILE_NOT_FOUND {
                        return Err(access_error(
                            scope,
                            format!("RegDeleteValueW failed: {status:?}"),
                        )
                        .into());
                    }
                }
            }
        }

        for (name, value) in entries {
            Self::set_value(&key, scope, name, value)?;
        }
        broadcast(&self.notifier);
        Ok(())
    }
}
