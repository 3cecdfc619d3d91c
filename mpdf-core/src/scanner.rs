//! Concurrent discovery of candidate files
//!
//! Every direct child of the input directory gets its own classification task
//! on a rayon pool. Tasks report matches and failures over a flume channel to
//! a single aggregator; the first failure abandons the scan. Tasks that finish
//! afterwards find the receiver gone and drop their result.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::classifier::{Classifier, SignatureClassifier};
use crate::error::ScanError;

/// A file that passed classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    path: PathBuf,
    modified_at: SystemTime,
}

impl CandidateFile {
    pub fn new(path: PathBuf, modified_at: SystemTime) -> Self {
        Self { path, modified_at }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// Size of a dedicated worker pool (None = shared rayon pool)
    pub threads: Option<usize>,
    /// Give up when the whole scan takes longer than this
    pub deadline: Option<Duration>,
}

type Published = Result<CandidateFile, ScanError>;

pub struct Scanner<C = SignatureClassifier> {
    classifier: Arc<C>,
    options: ScanOptions,
}

impl Scanner<SignatureClassifier> {
    pub fn pdf(options: ScanOptions) -> Self {
        Self::new(SignatureClassifier::pdf(), options)
    }
}

impl<C: Classifier> Scanner<C> {
    pub fn new(classifier: C, options: ScanOptions) -> Self {
        Self {
            classifier: Arc::new(classifier),
            options,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Collect the matching direct children of `dir`.
    ///
    /// Subdirectories are skipped without being descended into. The returned
    /// order is completion order and carries no meaning. Candidate paths are
    /// absolute even when `dir` is relative.
    pub fn scan(&self, dir: &Path) -> Result<Vec<CandidateFile>, ScanError> {
        let dir = std::path::absolute(dir).map_err(|source| ScanError::Resolve {
            dir: dir.to_path_buf(),
            source,
        })?;
        let dir = dir.as_path();

        let pool = match self.options.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("mpdf-scan-{}", i))
                    .build()?,
            ),
            None => None,
        };

        let started = Instant::now();
        // A deadline past what Instant can represent means no deadline.
        let deadline = self.options.deadline.and_then(|d| started.checked_add(d));
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = flume::unbounded::<Published>();

        let mut launched = 0usize;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    cancel.store(true, Ordering::Release);
                    return Err(ScanError::Enumerate {
                        dir: dir.to_path_buf(),
                        source,
                    });
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let modified_at = match entry.metadata() {
                Ok(md) => md.modified().map_err(|source| ScanError::Metadata {
                    path: entry.path().to_path_buf(),
                    source,
                }),
                Err(source) => Err(ScanError::Enumerate {
                    dir: dir.to_path_buf(),
                    source,
                }),
            };
            let modified_at = match modified_at {
                Ok(t) => t,
                Err(e) => {
                    cancel.store(true, Ordering::Release);
                    return Err(e);
                }
            };

            let candidate = CandidateFile::new(entry.into_path(), modified_at);
            let classifier = Arc::clone(&self.classifier);
            let cancel = Arc::clone(&cancel);
            let tx = tx.clone();
            let task = move || classify_task(&*classifier, candidate, &cancel, &tx);
            match pool {
                Some(ref pool) => pool.spawn(task),
                None => rayon::spawn(task),
            }
            launched += 1;
        }
        // Only the tasks hold senders now; the channel disconnects when the last one ends.
        drop(tx);
        debug!("Launched {} classification tasks under {}", launched, dir.display());

        let result = aggregate(rx, deadline).map_err(|e| match e {
            Abort::Failed(e) => e,
            Abort::Expired => ScanError::Timeout {
                dir: dir.to_path_buf(),
                elapsed: started.elapsed(),
            },
        });

        match result {
            Ok(found) => {
                debug!("Found {} matching files under {}", found.len(), dir.display());
                Ok(found)
            }
            Err(e) => {
                cancel.store(true, Ordering::Release);
                warn!("Abandoning scan of {}: {}", dir.display(), e);
                Err(e)
            }
        }
    }
}

enum Abort {
    Failed(ScanError),
    Expired,
}

/// Drain published results until every task is done or one of them fails.
/// Consumes the receiver, so returning early disconnects the channel.
fn aggregate(rx: Receiver<Published>, deadline: Option<Instant>) -> Result<Vec<CandidateFile>, Abort> {
    let mut found = Vec::new();
    loop {
        let published = match deadline {
            Some(deadline) => match rx.recv_deadline(deadline) {
                Ok(p) => p,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => return Err(Abort::Expired),
            },
            None => match rx.recv() {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        found.push(published.map_err(Abort::Failed)?);
    }
    Ok(found)
}

fn classify_task<C: Classifier + ?Sized>(
    classifier: &C,
    candidate: CandidateFile,
    cancel: &AtomicBool,
    tx: &Sender<Published>,
) {
    if cancel.load(Ordering::Acquire) {
        return;
    }

    let published = match classifier.classify(candidate.path()) {
        Ok(true) => Ok(candidate),
        Ok(false) => return,
        Err(source) => Err(ScanError::Classify {
            path: candidate.into_path(),
            source,
        }),
    };
    // Fails only when the aggregator has already given up.
    let _ = tx.send(published);
}
