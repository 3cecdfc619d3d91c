//! File type detection from leading bytes

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// MIME type of the documents we merge
pub const MIME_TYPE_PDF: &str = "application/pdf";

/// Number of leading bytes inspected; enough for every `infer` matcher
pub const FILE_HEADER_LENGTH_BYTES: usize = 261;

/// Decides whether a file belongs in the merge.
///
/// Implementations are shared across scan workers, so they must be
/// thread-safe and free of side effects.
pub trait Classifier: Send + Sync + 'static {
    fn classify(&self, path: &Path) -> io::Result<bool>;
}

/// Matches files whose header carries a given MIME signature
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    mime: &'static str,
    window: usize,
}

impl SignatureClassifier {
    pub fn new(mime: &'static str, window: usize) -> Self {
        Self { mime, window }
    }

    pub fn pdf() -> Self {
        Self::new(MIME_TYPE_PDF, FILE_HEADER_LENGTH_BYTES)
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Check an in-memory header
    pub fn matches(&self, head: &[u8]) -> bool {
        infer::is_mime(head, self.mime)
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::pdf()
    }
}

impl Classifier for SignatureClassifier {
    fn classify(&self, path: &Path) -> io::Result<bool> {
        let file = File::open(path)?;
        let head = read_head(file, self.window)?;
        Ok(self.matches(&head))
    }
}

/// Read at most `limit` bytes. Hitting end-of-file early is not an error,
/// the returned buffer is just shorter.
fn read_head<R: Read>(reader: R, limit: usize) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(limit);
    reader.take(limit as u64).read_to_end(&mut head)?;
    Ok(head)
}
