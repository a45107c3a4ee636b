//! Filesystem locations: user config directory, workspace state directory, log file.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "scopeseq";

/// `$XDG_CONFIG_HOME`, or `~/.config` when it is unset.
pub fn config_home() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}

/// `<config_home>/scopeseq`
pub fn app_config_dir() -> Option<PathBuf> {
    config_home().map(|dir| dir.join(APP_NAME))
}

/// Per-workspace directory for secrets and local state.
pub fn workspace_state_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(format!(".{}", APP_NAME))
}

/// Default log file: the platform state directory, else the workspace state directory.
pub fn default_log_file(workspace_root: &Path) -> PathBuf {
    let file_name = format!("{}.log", APP_NAME);
    match ProjectDirs::from("", "", APP_NAME) {
        Some(dirs) => dirs
            .state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .join(file_name),
        None => workspace_state_dir(workspace_root).join(file_name),
    }
}
