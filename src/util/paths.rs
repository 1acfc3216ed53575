//! Where lrtag looks for its per-user files

use std::path::PathBuf;

const DATA_DIR_NAME: &str = ".lrtag";
const CONFIG_FILE_NAME: &str = "config.toml";

/// `~/.lrtag`, or `.lrtag` relative to the working directory when the home
/// directory is unknown
pub fn data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DATA_DIR_NAME),
        None => PathBuf::from(DATA_DIR_NAME),
    }
}

/// Default config file read when `--config` is not given
pub fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE_NAME)
}
