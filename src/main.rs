//! mpdf - merge the PDF files of a directory into one document

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mpdf_core::{ExternalMerger, Orchestrator, RunOutcome};
use std::time::Duration;

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings();

    log::debug!("Settings: {:?}", settings);

    let merger = ExternalMerger::new(settings.tool);
    let orchestrator = Orchestrator::new(settings, merger);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!(
        "Merging PDF files under {}",
        orchestrator.settings().input_dir.display()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = orchestrator.run();
    spinner.finish_and_clear();

    match outcome? {
        RunOutcome::Merged { inputs, output } => {
            println!("Merged {} PDF files into {}", inputs, output.display());
        }
        RunOutcome::NotEnoughCandidates { found } => {
            println!(
                "Found {} PDF files under {}. Skip merging",
                found,
                orchestrator.settings().input_dir.display()
            );
        }
    }

    Ok(())
}
