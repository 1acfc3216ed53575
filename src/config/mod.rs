mod settings;

pub use settings::{
    Config, ConfigError, OnError, RewriteConfig, RunConfig, ScanConfig, EXAMPLE_CONFIG,
};
