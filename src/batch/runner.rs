//! Batch rewrite over a directory tree

use std::fs;
use std::path::{Path, PathBuf};

use super::discover::{SessionDir, SessionWalker};
use super::error::BatchError;
use crate::config::{Config, ConfigError, OnError};
use crate::rewrite::{Action, DeclarationsOutcome, Rewriter};
use crate::util::write_atomic;

/// A file that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Session directories visited
    pub sessions: usize,
    /// Scripts whose content changed (or would, in a dry run)
    pub scripts_changed: usize,
    /// Scripts that were already in the requested state
    pub scripts_unchanged: usize,
    pub headers_inserted: usize,
    pub headers_removed: usize,
    /// Declarations files whose content changed (or would)
    pub declarations_changed: usize,
    /// Declarations files with no `#endif` to anchor the helper
    pub missing_guards: Vec<PathBuf>,
    /// Files skipped because of the exclusion list
    pub excluded: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies one action to every session directory under a root
#[derive(Debug)]
pub struct Runner<'a> {
    config: &'a Config,
    rewriter: Rewriter,
    action: Action,
    dry_run: bool,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a Config, action: Action) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            rewriter: config.rewriter()?,
            action,
            dry_run: false,
        })
    }

    /// Compute every rewrite but leave files untouched
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Walk `root` and rewrite every eligible file.
    ///
    /// With [`OnError::Continue`] failures are recorded in the report and the
    /// walk goes on; with [`OnError::Abort`] the first failure is returned.
    pub fn run(&self, root: &Path) -> Result<RunReport, BatchError> {
        if !root.is_dir() {
            return Err(BatchError::NotADirectory(root.to_path_buf()));
        }

        let mut report = RunReport::default();

        for session in SessionWalker::new(root, &self.config.scan) {
            match session {
                Ok(session) => self.run_session(&session, &mut report)?,
                Err(e) => self.record_failure(e, &mut report)?,
            }
        }

        tracing::info!(
            action = %self.action,
            dry_run = self.dry_run,
            sessions = report.sessions,
            scripts_changed = report.scripts_changed,
            scripts_unchanged = report.scripts_unchanged,
            headers_inserted = report.headers_inserted,
            headers_removed = report.headers_removed,
            declarations_changed = report.declarations_changed,
            failures = report.failures.len(),
            "Run finished"
        );

        Ok(report)
    }

    fn run_session(&self, session: &SessionDir, report: &mut RunReport) -> Result<(), BatchError> {
        report.sessions += 1;
        tracing::info!(
            session = %session.session_tag,
            dir = %session.dir.display(),
            "Found session"
        );

        for path in &session.excluded {
            tracing::info!(path = %path.display(), "Skipping excluded file");
            report.excluded.push(path.clone());
        }

        for path in &session.scripts {
            if let Err(e) = self.process_script(path, &session.session_tag, report) {
                self.record_failure(e, report)?;
            }
        }

        if let Some(path) = &session.declarations {
            if let Err(e) = self.process_declarations(path, report) {
                self.record_failure(e, report)?;
            }
        }

        Ok(())
    }

    fn process_script(
        &self,
        path: &Path,
        session_tag: &str,
        report: &mut RunReport,
    ) -> Result<(), BatchError> {
        let text = read(path)?;
        let rewrite = self.rewriter.rewrite_script(&text, session_tag, self.action);

        report.headers_inserted += rewrite.inserted;
        report.headers_removed += rewrite.removed;

        if rewrite.text == text {
            report.scripts_unchanged += 1;
            tracing::debug!(path = %path.display(), "Script unchanged");
            return Ok(());
        }

        self.write(path, &rewrite.text)?;
        report.scripts_changed += 1;
        tracing::info!(
            path = %path.display(),
            inserted = rewrite.inserted,
            removed = rewrite.removed,
            dry_run = self.dry_run,
            "Rewrote script"
        );
        Ok(())
    }

    fn process_declarations(&self, path: &Path, report: &mut RunReport) -> Result<(), BatchError> {
        let text = read(path)?;
        let update = self.rewriter.rewrite_declarations(&text, self.action);

        if update.outcome == DeclarationsOutcome::MissingGuard {
            tracing::warn!(
                path = %path.display(),
                action = %self.action,
                "No #endif found, helper left as is"
            );
            report.missing_guards.push(path.to_path_buf());
        }

        if update.text == text {
            tracing::debug!(path = %path.display(), outcome = ?update.outcome, "Declarations unchanged");
            return Ok(());
        }

        self.write(path, &update.text)?;
        report.declarations_changed += 1;
        tracing::info!(
            path = %path.display(),
            outcome = ?update.outcome,
            dry_run = self.dry_run,
            "Updated declarations"
        );
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BatchError> {
        if self.dry_run {
            return Ok(());
        }
        write_atomic(path, contents).map_err(|source| BatchError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn record_failure(&self, error: BatchError, report: &mut RunReport) -> Result<(), BatchError> {
        match self.config.run.on_error {
            OnError::Abort => Err(error),
            OnError::Continue => {
                tracing::error!(path = %error.path().display(), error = %error, "Failed to process");
                report.failures.push(FileFailure {
                    path: error.path().to_path_buf(),
                    message: error.to_string(),
                });
                Ok(())
            }
        }
    }
}

fn read(path: &Path) -> Result<String, BatchError> {
    fs::read_to_string(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })
}
