//! XDG Base Directory paths for pagebrief.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths. This matches tools like gh, docker, kubectl.

use std::path::PathBuf;

const APP_DIR: &str = "pagebrief";

/// Get the pagebrief config directory.
///
/// Returns `$XDG_CONFIG_HOME/pagebrief` if set, otherwise `~/.config/pagebrief`.
/// This is where `config.toml` lives.
///
/// # Examples
///
/// ```
/// use pagebrief_paths::config_dir;
///
/// let config = config_dir();
/// let file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Get the pagebrief data directory.
///
/// Returns `$XDG_DATA_HOME/pagebrief` if set, otherwise `~/.local/share/pagebrief`.
/// Summary history is stored here.
///
/// # Examples
///
/// ```
/// use pagebrief_paths::data_dir;
///
/// let data = data_dir();
/// let history = data.join("history.json");
/// ```
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn xdg_dir(env_var: &str, home_fallback: &str) -> PathBuf {
    if let Ok(base) = std::env::var(env_var)
        && !base.is_empty()
    {
        PathBuf::from(base).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(home_fallback).join(APP_DIR)
    } else {
        PathBuf::from(home_fallback).join(APP_DIR)
    }
}
