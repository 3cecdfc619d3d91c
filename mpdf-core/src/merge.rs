//! Hand-off to the tool that actually combines the documents
//!
//! The pipeline never looks inside a PDF. Merging is a single call on a
//! [`Merger`], made once with the complete ordered list or not at all.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::MergeError;

pub trait Merger {
    /// Combine `inputs`, in order, into a new document at `output`
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError>;
}

impl<M: Merger + ?Sized> Merger for &M {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        (**self).merge(inputs, output)
    }
}

/// Command-line PDF tools we know how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeTool {
    /// pdfcpu if installed, qpdf otherwise
    #[default]
    Auto,
    Pdfcpu,
    Qpdf,
}

impl MergeTool {
    pub fn program(self) -> Option<&'static str> {
        match self {
            MergeTool::Auto => None,
            MergeTool::Pdfcpu => Some("pdfcpu"),
            MergeTool::Qpdf => Some("qpdf"),
        }
    }

    /// Build the invocation for a concrete tool
    pub fn command(self, program: impl AsRef<Path>, inputs: &[PathBuf], output: &Path) -> Command {
        let mut cmd = Command::new(program.as_ref());
        match self {
            MergeTool::Qpdf => {
                cmd.arg("--empty").arg("--pages");
                cmd.args(inputs);
                cmd.arg("--").arg(output);
            }
            MergeTool::Pdfcpu | MergeTool::Auto => {
                cmd.arg("merge").arg(output);
                cmd.args(inputs);
            }
        }
        cmd
    }
}

/// Runs an installed PDF tool found in PATH
#[derive(Debug, Clone, Default)]
pub struct ExternalMerger {
    tool: MergeTool,
}

impl ExternalMerger {
    pub fn new(tool: MergeTool) -> Self {
        Self { tool }
    }

    /// Pick the concrete tool and its full path
    fn locate(&self) -> Result<(MergeTool, PathBuf), MergeError> {
        let candidates: &[MergeTool] = match self.tool {
            MergeTool::Auto => &[MergeTool::Pdfcpu, MergeTool::Qpdf],
            MergeTool::Pdfcpu => &[MergeTool::Pdfcpu],
            MergeTool::Qpdf => &[MergeTool::Qpdf],
        };

        for &tool in candidates {
            if let Some(program) = tool.program() {
                if let Ok(path) = which::which(program) {
                    return Ok((tool, path));
                }
            }
        }

        Err(MergeError::ToolNotFound {
            tried: candidates.iter().filter_map(|t| t.program()).collect(),
        })
    }
}

impl Merger for ExternalMerger {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        let (tool, program) = self.locate()?;
        let name = tool.program().unwrap_or("merge tool").to_string();
        debug!("Merging {} files into {} with {}", inputs.len(), output.display(), program.display());

        let result = tool
            .command(&program, inputs, output)
            .output()
            .map_err(|source| MergeError::Spawn {
                tool: name.clone(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MergeError::Failed {
                tool: name,
                status: result.status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
