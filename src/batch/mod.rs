//! Directory-level batch processing
//!
//! [`SessionWalker`] finds every directory that carries a session marker and
//! [`Runner`] feeds its scripts and declarations file through the rewriter.

pub mod discover;
pub mod error;
pub mod runner;

pub use discover::{scan_dir, SessionDir, SessionWalker};
pub use error::BatchError;
pub use runner::{FileFailure, RunReport, Runner};
