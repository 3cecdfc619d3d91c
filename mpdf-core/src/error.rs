//! Error types for the mpdf pipeline

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Top-level pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to resolve absolute path of {}: {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write to output path {}", path.display())]
    OutputNotWritable { path: PathBuf },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Failed to merge PDF files: {0}")]
    Merge(#[from] MergeError),
}

/// Errors raised while inspecting the requested output location
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to inspect output path {}: {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while scanning the input directory
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to resolve absolute path of {}: {source}", dir.display())]
    Resolve {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read directory {}: {source}", dir.display())]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read metadata of {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to check type of file {}: {source}", path.display())]
    Classify {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Scanning {} did not finish within {elapsed:?}", dir.display())]
    Timeout { dir: PathBuf, elapsed: Duration },

    #[error("Failed to create scan thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors reported by a [`crate::merge::Merger`]
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("No PDF merge tool found in PATH (tried: {})", tried.join(", "))]
    ToolNotFound { tried: Vec<&'static str> },

    #[error("Failed to execute {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}
