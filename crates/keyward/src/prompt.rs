// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or environment variable.

use keyward_core::VaultError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "KEYWARD_MASTER_PASSWORD";

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `KEYWARD_MASTER_PASSWORD` (for scripts)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, VaultError> {
    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Master password: ");
        let password = rpassword::read_password()
            .map_err(|e| VaultError::Crypto(format!("failed to read password: {e}")))?;
        if password.is_empty() {
            return Err(VaultError::Crypto("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(password));
    }

    Err(VaultError::Crypto(format!(
        "no password provided. Set {MASTER_PASSWORD_ENV_VAR} or run interactively."
    )))
}
