//! End-to-end run: check the output, scan, order, merge

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::classifier::{Classifier, SignatureClassifier};
use crate::error::Error;
use crate::merge::{MergeTool, Merger};
use crate::order::{Order, SortKey};
use crate::output;
use crate::scanner::{ScanOptions, Scanner};

/// Everything a run needs, captured once from the command line
#[derive(Clone, Debug)]
pub struct MergeSettings {
    /// Directory whose direct children are merged
    pub input_dir: PathBuf,
    /// Output file, or a directory to place a generated file in
    pub output: PathBuf,
    pub order: Order,
    /// Replace an existing output file
    pub overwrite: bool,
    pub scan: ScanOptions,
    pub tool: MergeTool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output: PathBuf::from("."),
            order: Order::default(),
            overwrite: false,
            scan: ScanOptions::default(),
            tool: MergeTool::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Merged { inputs: usize, output: PathBuf },
    /// Fewer than two PDF files; nothing was written
    NotEnoughCandidates { found: usize },
}

pub struct Orchestrator<M, C = SignatureClassifier> {
    settings: MergeSettings,
    scanner: Scanner<C>,
    merger: M,
}

impl<M: Merger> Orchestrator<M, SignatureClassifier> {
    pub fn new(settings: MergeSettings, merger: M) -> Self {
        let scanner = Scanner::pdf(settings.scan.clone());
        Self {
            settings,
            scanner,
            merger,
        }
    }
}

impl<M: Merger, C: Classifier> Orchestrator<M, C> {
    pub fn with_classifier(settings: MergeSettings, classifier: C, merger: M) -> Self {
        let scanner = Scanner::new(classifier, settings.scan.clone());
        Self {
            settings,
            scanner,
            merger,
        }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Resolve the output, scan, order, merge.
    ///
    /// The output is checked before any scanning so an unwritable target fails
    /// fast. The merger is called at most once, with the full ordered list.
    pub fn run(&self) -> Result<RunOutcome, Error> {
        let output_path = absolute(&self.settings.output)?;
        let decision = output::resolve(&output_path, self.settings.overwrite)?;
        if !decision.writable {
            return Err(Error::OutputNotWritable { path: output_path });
        }
        debug!("Writing merged document to {}", decision.resolved_path.display());

        let input_dir = absolute(&self.settings.input_dir)?;
        let candidates = self.scanner.scan(&input_dir)?;
        if candidates.len() < 2 {
            info!(
                "Found {} PDF files under {}, skip merging",
                candidates.len(),
                input_dir.display()
            );
            return Ok(RunOutcome::NotEnoughCandidates {
                found: candidates.len(),
            });
        }

        let ordered: Vec<PathBuf> = self
            .settings
            .order
            .apply(candidates)
            .into_iter()
            .map(|c| c.into_path())
            .collect();

        self.merger.merge(&ordered, &decision.resolved_path)?;

        Ok(RunOutcome::Merged {
            inputs: ordered.len(),
            output: decision.resolved_path,
        })
    }
}

/// One-shot run with default scan options
pub fn run<M: Merger>(
    input_dir: &Path,
    output: &Path,
    key: SortKey,
    reversed: bool,
    overwrite: bool,
    merger: M,
) -> Result<RunOutcome, Error> {
    let settings = MergeSettings {
        input_dir: input_dir.to_path_buf(),
        output: output.to_path_buf(),
        order: Order::new(key, reversed),
        overwrite,
        ..MergeSettings::default()
    };
    Orchestrator::new(settings, merger).run()
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    std::path::absolute(path).map_err(|source| Error::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}
