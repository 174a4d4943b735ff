//! Document discovery.
//!
//! Walks a root directory recursively and collects every Markdown file in a
//! deterministic order. The order is load-bearing: it decides the section
//! order of the merged document.

use crate::errors::MergeError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name suffix of documents picked up by the locator.
pub const DOCUMENT_EXTENSION: &str = ".md";

/// Characters Windows refuses in file names. Documents carrying them still get
/// merged but usually break somewhere downstream.
const SUSPICIOUS_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Ordered, duplicate-free set of documents under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    root: PathBuf,
    documents: Vec<PathBuf>,
}

impl DocumentSet {
    /// Locate all documents under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::NoDocuments`] when nothing matches, and
    /// [`MergeError::Io`] when the root cannot be read. Unreadable
    /// subdirectories are logged and skipped.
    pub fn locate(root: &Path) -> Result<Self, MergeError> {
        let mut documents = Vec::new();
        visit_dir(root, &mut documents)?;

        let set = Self::from_paths(root, documents);
        if set.is_empty() {
            return Err(MergeError::NoDocuments {
                root: root.to_path_buf(),
            });
        }

        debug!(count = set.len(), root = %root.display(), "located documents");
        Ok(set)
    }

    /// Build a set from already known paths, applying the ordering rules.
    ///
    /// Paths are sorted by their full string form, so `a.md` sorts before
    /// `a/b.md` the same way on every platform.
    pub fn from_paths(root: &Path, mut documents: Vec<PathBuf>) -> Self {
        documents.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        documents.dedup();
        Self {
            root: root.to_path_buf(),
            documents,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn documents(&self) -> &[PathBuf] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.documents.iter()
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Whether a file name is picked up as a document.
pub fn is_document(file_name: &str) -> bool {
    file_name.ends_with(DOCUMENT_EXTENSION)
}

/// Characters in `file_name` that are likely to cause trouble downstream.
pub fn suspicious_chars(file_name: &str) -> Vec<char> {
    SUSPICIOUS_NAME_CHARS
        .iter()
        .copied()
        .filter(|c| file_name.contains(*c))
        .collect()
}

/// Recursively visit a directory and collect documents.
///
/// Symlinked directories are not followed; symlinked files are.
fn visit_dir(dir: &Path, documents: &mut Vec<PathBuf>) -> Result<(), MergeError> {
    let entries = fs::read_dir(dir).map_err(|e| MergeError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| MergeError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| MergeError::io(&path, e))?;

        if file_type.is_dir() {
            // Only the root itself has to be readable.
            if let Err(e) = visit_dir(&path, documents) {
                warn!("Skipping unreadable directory: {}", e);
            }
            continue;
        }

        let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
        if !is_file {
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if !is_document(&file_name) {
            continue;
        }

        for c in suspicious_chars(&file_name) {
            warn!(
                "File name contains special character '{}', conversion may fail: {}",
                c,
                path.display()
            );
        }
        documents.push(path);
    }

    Ok(())
}
