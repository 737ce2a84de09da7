// SPDX-License-Identifier: MPL-2.0
//! Config and data directory resolution.
//!
//! Both directories resolve in the same priority order:
//! 1. **Explicit override**: the parameter to the `_with_override()` functions (tests)
//! 2. **CLI arguments** (`--config-dir`, `--data-dir`), set once via [`init_cli_overrides`]
//! 3. **Environment variables** (`EYE_FATIGUE_CONFIG_DIR`, `EYE_FATIGUE_DATA_DIR`)
//! 4. **Platform default** from the `dirs` crate, with the app name appended
//!
//! The config directory holds `settings.toml` (user preferences). The data
//! directory holds `state.cbor` (remembered dialog directories).

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "EyeFatigue";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "EYE_FATIGUE_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "EYE_FATIGUE_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records the `--data-dir` and `--config-dir` CLI arguments.
///
/// Only the first call has an effect; returns `false` if overrides were
/// already initialized.
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) -> bool {
    let data_set = CLI_DATA_DIR.set(data_dir.map(PathBuf::from)).is_ok();
    let config_set = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from)).is_ok();
    data_set && config_set
}

/// Returns the application data directory.
///
/// - Linux: `~/.local/share/EyeFatigue/`
/// - macOS: `~/Library/Application Support/EyeFatigue/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\EyeFatigue\`
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Returns the application data directory, preferring `override_path`.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(
        override_path,
        CLI_DATA_DIR.get().and_then(Clone::clone),
        ENV_DATA_DIR,
        dirs::data_dir,
    )
}

/// Returns the application config directory.
///
/// - Linux: `~/.config/EyeFatigue/`
/// - macOS: `~/Library/Application Support/EyeFatigue/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\EyeFatigue\`
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory, preferring `override_path`.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(
        override_path,
        CLI_CONFIG_DIR.get().and_then(Clone::clone),
        ENV_CONFIG_DIR,
        dirs::config_dir,
    )
}

fn resolve(
    override_path: Option<PathBuf>,
    cli_path: Option<PathBuf>,
    env_var: &str,
    platform_dir: fn() -> Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = override_path.or(cli_path) {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(env_var) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    platform_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}
