//! mpdf core - discovers the PDF files of a directory and prepares them for merging
//!
//! The pipeline is: scan the direct children of a directory, classify each one
//! by its leading bytes, order the matches, resolve where the merged document
//! goes, then hand everything to a [`merge::Merger`].

pub mod classifier;
pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod order;
pub mod output;
pub mod scanner;

// Re-exports
pub use classifier::{Classifier, SignatureClassifier};
pub use error::{Error, MergeError, OutputError, ScanError};
pub use merge::{ExternalMerger, MergeTool, Merger};
pub use orchestrator::{run, MergeSettings, Orchestrator, RunOutcome};
pub use order::{order, Order, SortKey};
pub use output::{resolve, OutputDecision};
pub use scanner::{CandidateFile, ScanOptions, Scanner};
