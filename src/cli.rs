//! Command-line interface for mpdf

use clap::{Parser, ValueEnum};
use mpdf_core::{MergeSettings, MergeTool, Order, ScanOptions, SortKey};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "mpdf")]
#[command(about = "Merge the PDF files of a directory into one document", long_about = None)]
pub struct Cli {
    /// Path to the directory containing PDF files to merge
    #[arg(long = "in", value_name = "DIR", default_value = ".")]
    pub input: PathBuf,

    /// Path to the merged PDF file, or a directory to put it in
    #[arg(long = "out", value_name = "PATH", default_value = ".")]
    pub output: PathBuf,

    /// Merge PDF files in the order of last modification time
    #[arg(short = 'c')]
    pub chrono: bool,

    /// Reverse merge order
    #[arg(short = 'r')]
    pub reversed: bool,

    /// Overwrite even if output file already exists
    #[arg(short = 'f')]
    pub overwrite: bool,

    /// Number of threads checking file types (default: one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Give up scanning after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// External tool used to merge
    #[arg(long, value_enum, default_value = "auto")]
    pub tool: ToolArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ToolArg {
    Auto,
    Pdfcpu,
    Qpdf,
}

impl From<ToolArg> for MergeTool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Auto => MergeTool::Auto,
            ToolArg::Pdfcpu => MergeTool::Pdfcpu,
            ToolArg::Qpdf => MergeTool::Qpdf,
        }
    }
}

impl Cli {
    pub fn settings(&self) -> MergeSettings {
        let key = if self.chrono {
            SortKey::ByModificationTime
        } else {
            SortKey::ByFilename
        };

        MergeSettings {
            input_dir: self.input.clone(),
            output: self.output.clone(),
            order: Order::new(key, self.reversed),
            overwrite: self.overwrite,
            scan: ScanOptions {
                threads: self.threads,
                deadline: self.timeout.map(Duration::from_secs),
            },
            tool: self.tool.into(),
        }
    }
}
