//! Discovery of session directories and the files to rewrite in them

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::BatchError;
use crate::config::ScanConfig;

/// A directory holding a session marker, with the files to rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    pub dir: PathBuf,
    /// Marker file name without its extension
    pub session_tag: String,
    /// Scripts to instrument, in name order
    pub scripts: Vec<PathBuf>,
    /// The shared declarations file, if the directory has one
    pub declarations: Option<PathBuf>,
    /// Files that matched but are on the exclusion list
    pub excluded: Vec<PathBuf>,
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

/// Look at the regular files directly inside `dir` and build its session,
/// or `None` when it holds no marker file.
pub fn scan_dir(dir: &Path, scan: &ScanConfig) -> Result<Option<SessionDir>, BatchError> {
    let list_err = |source| BatchError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if entry.file_type().map_err(list_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let Some(session_tag) = files
        .iter()
        .find(|path| has_extension(path, &scan.marker_extension))
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
    else {
        return Ok(None);
    };

    let mut session = SessionDir {
        dir: dir.to_path_buf(),
        session_tag,
        scripts: Vec::new(),
        declarations: None,
        excluded: Vec::new(),
    };

    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_script = has_extension(&path, &scan.script_extension);
        let is_declarations = name == scan.declarations_file;
        if !is_script && !is_declarations {
            continue;
        }

        if scan.excluded_files.contains(name) {
            session.excluded.push(path);
        } else if is_declarations {
            session.declarations = Some(path);
        } else {
            session.scripts.push(path);
        }
    }

    Ok(Some(session))
}

/// Recursive walk over a root directory yielding every session directory
/// in name order. Symlinks are not followed.
pub struct SessionWalker<'a> {
    walker: walkdir::IntoIter,
    scan: &'a ScanConfig,
    root: PathBuf,
}

impl<'a> SessionWalker<'a> {
    pub fn new(root: &Path, scan: &'a ScanConfig) -> Self {
        Self {
            walker: WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
            scan,
            root: root.to_path_buf(),
        }
    }
}

impl Iterator for SessionWalker<'_> {
    type Item = Result<SessionDir, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(BatchError::Walk { path, source }));
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            match scan_dir(entry.path(), self.scan) {
                Ok(Some(session)) => return Some(Ok(session)),
                Ok(None) => {
                    tracing::debug!(dir = %entry.path().display(), "No session marker, skipping");
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
