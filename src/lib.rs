pub mod batch;
pub mod config;
pub mod rewrite;
pub mod util;

pub use batch::{BatchError, RunReport, Runner, SessionDir, SessionWalker};
pub use config::{Config, ConfigError, OnError};
pub use rewrite::{Action, HeaderCallSpec, Rewriter, ScriptRewrite, TransactionContext};
