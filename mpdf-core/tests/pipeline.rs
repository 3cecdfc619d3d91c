use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use mpdf_core::{
    run, Error, MergeError, MergeSettings, Merger, Order, Orchestrator, RunOutcome, ScanOptions,
    SortKey,
};
use tempfile::TempDir;

const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n%%EOF\n";

/// Remembers every call instead of merging
#[derive(Default)]
struct RecordingMerger {
    calls: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
}

impl RecordingMerger {
    fn calls(&self) -> Vec<(Vec<PathBuf>, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Merger for RecordingMerger {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        self.calls
            .lock()
            .unwrap()
            .push((inputs.to_vec(), output.to_path_buf()));
        Ok(())
    }
}

struct PanickingMerger;

impl Merger for PanickingMerger {
    fn merge(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), MergeError> {
        panic!("merge must not be reached");
    }
}

struct FailingMerger;

impl Merger for FailingMerger {
    fn merge(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), MergeError> {
        Err(MergeError::ToolNotFound { tried: vec!["pdfcpu"] })
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// in/ with b.pdf, a.pdf, c.pdf, notes.txt and a nested dir; out/ empty
fn setup() -> Result<(TempDir, PathBuf, PathBuf)> {
    let temp = TempDir::new()?;
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    fs::create_dir(&input)?;
    fs::create_dir(&output)?;

    for name in ["b.pdf", "a.pdf", "c.pdf"] {
        fs::write(input.join(name), PDF)?;
    }
    fs::write(input.join("notes.txt"), b"not a pdf at all")?;
    fs::create_dir(input.join("nested"))?;
    fs::write(input.join("nested").join("d.pdf"), PDF)?;

    Ok((temp, input, output))
}

#[test]
fn test_merges_matching_files_by_name() -> Result<()> {
    let (_temp, input, output) = setup()?;
    let merger = RecordingMerger::default();

    let outcome = run(&input, &output, SortKey::ByFilename, false, false, &merger)?;

    let calls = merger.calls();
    assert_eq!(calls.len(), 1);
    let (paths, out) = &calls[0];
    assert_eq!(file_names(paths), vec!["a.pdf", "b.pdf", "c.pdf"]);
    assert!(paths.iter().all(|p| p.is_absolute() && p.parent() == Some(input.as_path())));

    assert_eq!(out.parent(), Some(output.as_path()));
    assert!(out.file_name().unwrap().to_string_lossy().starts_with("merged-"));
    assert_eq!(
        outcome,
        RunOutcome::Merged {
            inputs: 3,
            output: out.clone()
        }
    );
    Ok(())
}

#[test]
fn test_reversed_order_reaches_merger() -> Result<()> {
    let (_temp, input, output) = setup()?;
    let merger = RecordingMerger::default();

    run(&input, &output, SortKey::ByFilename, true, false, &merger)?;

    let calls = merger.calls();
    assert_eq!(file_names(&calls[0].0), vec!["c.pdf", "b.pdf", "a.pdf"]);
    Ok(())
}

#[test]
fn test_orders_by_modification_time() -> Result<()> {
    let (_temp, input, output) = setup()?;
    let base = SystemTime::now() - Duration::from_secs(3600);
    for (name, offset) in [("a.pdf", 30), ("b.pdf", 10), ("c.pdf", 20)] {
        File::options()
            .write(true)
            .open(input.join(name))?
            .set_modified(base + Duration::from_secs(offset))?;
    }
    let merger = RecordingMerger::default();

    run(&input, &output, SortKey::ByModificationTime, false, false, &merger)?;

    assert_eq!(file_names(&merger.calls()[0].0), vec!["b.pdf", "c.pdf", "a.pdf"]);
    Ok(())
}

#[test]
fn test_single_match_is_a_no_op() -> Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("in");
    fs::create_dir(&input)?;
    fs::write(input.join("only.pdf"), PDF)?;
    fs::write(input.join("readme.md"), b"# readme")?;

    let outcome = run(&input, temp.path(), SortKey::ByFilename, false, false, PanickingMerger)?;

    assert_eq!(outcome, RunOutcome::NotEnoughCandidates { found: 1 });
    Ok(())
}

#[test]
fn test_existing_output_file_fails_before_scanning() -> Result<()> {
    let temp = TempDir::new()?;
    let existing = temp.path().join("merged.pdf");
    fs::write(&existing, PDF)?;
    // Scanning this would fail with a scan error
    let missing_input = temp.path().join("does-not-exist");

    let result = run(&missing_input, &existing, SortKey::ByFilename, false, false, PanickingMerger);

    match result {
        Err(Error::OutputNotWritable { path }) => assert_eq!(path, existing),
        other => panic!("expected OutputNotWritable, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_overwrite_targets_existing_file() -> Result<()> {
    let (temp, input, _output) = setup()?;
    let existing = temp.path().join("merged.pdf");
    fs::write(&existing, b"old")?;
    let merger = RecordingMerger::default();

    run(&input, &existing, SortKey::ByFilename, false, true, &merger)?;

    assert_eq!(merger.calls()[0].1, existing);
    Ok(())
}

#[test]
fn test_output_in_missing_directory_is_rejected() -> Result<()> {
    let (temp, input, _output) = setup()?;
    let target = temp.path().join("nope").join("merged.pdf");

    let result = run(&input, &target, SortKey::ByFilename, false, true, PanickingMerger);

    assert!(matches!(result, Err(Error::OutputNotWritable { .. })));
    Ok(())
}

#[test]
fn test_missing_input_directory_is_scan_error() -> Result<()> {
    let temp = TempDir::new()?;
    let result = run(
        &temp.path().join("absent"),
        temp.path(),
        SortKey::ByFilename,
        false,
        false,
        PanickingMerger,
    );

    assert!(matches!(result, Err(Error::Scan(_))));
    Ok(())
}

#[test]
fn test_merge_failure_is_surfaced() -> Result<()> {
    let (_temp, input, output) = setup()?;

    let result = run(&input, &output, SortKey::ByFilename, false, false, FailingMerger);

    assert!(matches!(
        result,
        Err(Error::Merge(MergeError::ToolNotFound { .. }))
    ));
    Ok(())
}

#[test]
fn test_orchestrator_with_dedicated_pool() -> Result<()> {
    let (_temp, input, output) = setup()?;
    let settings = MergeSettings {
        input_dir: input,
        output: output.clone(),
        order: Order::new(SortKey::ByFilename, true),
        scan: ScanOptions {
            threads: Some(2),
            deadline: Some(Duration::from_secs(30)),
        },
        ..MergeSettings::default()
    };
    let merger = RecordingMerger::default();

    let outcome = Orchestrator::new(settings, &merger).run()?;

    assert!(matches!(outcome, RunOutcome::Merged { inputs: 3, .. }));
    assert_eq!(file_names(&merger.calls()[0].0), vec!["c.pdf", "b.pdf", "a.pdf"]);
    Ok(())
}
