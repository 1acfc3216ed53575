//! Utility modules

pub mod fs;
pub mod paths;

pub use fs::write_atomic;
pub use paths::{config_path, data_dir};
