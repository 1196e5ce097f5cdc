use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// `<config dir>/tessera`, following the platform's base-directory convention
pub fn user_config_dir() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join("tessera"))
}

/// User-level configuration file, whether or not it exists
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Project-level configuration file inside `dir`
pub fn project_config_file(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}
