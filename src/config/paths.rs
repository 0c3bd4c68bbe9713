//! Config file location
//!
//! `$MESHROLL_CONFIG_DIR/config.yaml` when the variable is set. Otherwise
//! `$XDG_CONFIG_HOME/meshroll` or `~/.config/meshroll` on Unix (macOS
//! included), and the roaming AppData folder on Windows.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that overrides the config directory
pub const CONFIG_DIR_ENV: &str = "MESHROLL_CONFIG_DIR";

/// File name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const APP_NAME: &str = "meshroll";

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    resolve_config_dir(
        std::env::var_os(CONFIG_DIR_ENV),
        std::env::var_os("XDG_CONFIG_HOME"),
    )
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

fn resolve_config_dir(override_dir: Option<OsString>, xdg_config_home: Option<OsString>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform_config_dir(xdg_config_home.filter(|d| !d.is_empty()))
}

#[cfg(not(windows))]
fn platform_config_dir(xdg_config_home: Option<OsString>) -> PathBuf {
    let base = xdg_config_home.map(PathBuf::from).unwrap_or_else(|| {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".config"))
            .unwrap_or_else(|| PathBuf::from(".config"))
    });
    base.join(APP_NAME)
}

#[cfg(windows)]
fn platform_config_dir(_xdg_config_home: Option<OsString>) -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".config").join(APP_NAME))
}
