//! Output location checks
//!
//! Decision table for the requested output path:
//!   1. exists and is a file      -> writable only with overwrite;
//!   2. exists and is a directory -> writable, under a generated file name;
//!   3. doesn't exist             -> writable iff its parent is an existing directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::error::OutputError;

/// Result of checking the requested output path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDecision {
    pub writable: bool,
    pub resolved_path: PathBuf,
}

impl OutputDecision {
    fn writable(resolved_path: PathBuf) -> Self {
        Self {
            writable: true,
            resolved_path,
        }
    }

    fn denied(requested: &Path) -> Self {
        Self {
            writable: false,
            resolved_path: requested.to_path_buf(),
        }
    }
}

/// Decide whether `requested` can receive the merged document.
/// `requested` should be absolute.
pub fn resolve(requested: &Path, overwrite: bool) -> Result<OutputDecision, OutputError> {
    let metadata = match stat(requested)? {
        Some(md) => md,
        None => {
            let parent_is_dir = match requested.parent() {
                Some(parent) => stat(parent)?.map(|md| md.is_dir()).unwrap_or(false),
                None => false,
            };
            debug!(
                "Output {} does not exist (parent is a directory: {})",
                requested.display(),
                parent_is_dir
            );
            return Ok(if parent_is_dir {
                OutputDecision::writable(requested.to_path_buf())
            } else {
                OutputDecision::denied(requested)
            });
        }
    };

    if metadata.is_dir() {
        let name = unique_file_name(requested)?;
        return Ok(OutputDecision::writable(requested.join(name)));
    }

    Ok(if overwrite {
        OutputDecision::writable(requested.to_path_buf())
    } else {
        OutputDecision::denied(requested)
    })
}

/// `None` when nothing exists at `path`
fn stat(path: &Path) -> Result<Option<fs::Metadata>, OutputError> {
    match fs::metadata(path) {
        Ok(md) => Ok(Some(md)),
        Err(e) if is_absent(&e) => Ok(None),
        Err(source) => Err(OutputError::Inspect {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// A path under a regular file reports ENOTDIR rather than ENOENT
fn is_absent(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// `merged-<nanos>.pdf`, with a numeric suffix if that name is already taken
fn unique_file_name(dir: &Path) -> Result<String, OutputError> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut name = format!("merged-{}.pdf", nanos);
    let mut attempt = 0u32;
    while stat(&dir.join(&name))?.is_some() {
        attempt += 1;
        name = format!("merged-{}-{}.pdf", nanos, attempt);
    }
    Ok(name)
}
