//! Transient converter input files
//!
//! The typesetting conversion reads the merged text from a temporary file.
//! Normal exits and interrupts drop the handle, which deletes the file; a
//! `kill -9` or power loss does not, so stale inputs are swept on the next run.

use crate::errors::MergeError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const INPUT_PREFIX: &str = "mdmerge-";
pub const INPUT_SUFFIX: &str = ".md";

/// Inputs older than this are considered abandoned.
pub const STALE_INPUT_AGE: Duration = Duration::from_secs(3600);

/// Write `text` to a new transient input file in the system temp directory.
pub fn create_input(text: &str) -> Result<NamedTempFile, MergeError> {
    let mut input = tempfile::Builder::new()
        .prefix(INPUT_PREFIX)
        .suffix(INPUT_SUFFIX)
        .tempfile()
        .map_err(|e| MergeError::io(std::env::temp_dir(), e))?;
    input
        .write_all(text.as_bytes())
        .and_then(|_| input.flush())
        .map_err(|e| MergeError::io(input.path(), e))?;
    Ok(input)
}

/// Whether a file name looks like one of our transient inputs.
pub fn is_transient_input(file_name: &str) -> bool {
    file_name.starts_with(INPUT_PREFIX) && file_name.ends_with(INPUT_SUFFIX)
}

/// Remove transient inputs in `dir` at least `threshold` old.
///
/// Returns the number of files removed. Removal failures are logged and
/// skipped; only an unreadable `dir` is an error.
pub fn cleanup_stale_inputs(dir: &Path, threshold: Duration) -> Result<usize, MergeError> {
    let now = SystemTime::now();
    let mut removed = 0;

    for path in find_inputs(dir)? {
        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        let Some(age) = age else {
            continue;
        };
        if age < threshold {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed stale input {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove stale input {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}

fn find_inputs(dir: &Path) -> Result<Vec<PathBuf>, MergeError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| MergeError::io(dir, e))? {
        let entry = entry.map_err(|e| MergeError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_transient_input(&entry.file_name().to_string_lossy()) {
            inputs.push(entry.path());
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_transient_input() {
        assert!(is_transient_input("mdmerge-a1b2c3.md"));
        assert!(!is_transient_input("mdmerge-a1b2c3.pdf"));
        assert!(!is_transient_input("notes.md"));
    }

    #[test]
    fn test_cleanup_removes_only_old_inputs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mdmerge-old.md"), "x").unwrap();
        fs::write(temp.path().join("keep.md"), "x").unwrap();
        fs::write(temp.path().join("mdmerge-report.pdf"), "x").unwrap();

        let removed = cleanup_stale_inputs(temp.path(), Duration::ZERO).unwrap();

        assert_eq!(removed, 1);
        assert!(!temp.path().join("mdmerge-old.md").exists());
        assert!(temp.path().join("keep.md").exists());
        assert!(temp.path().join("mdmerge-report.pdf").exists());
    }

    #[test]
    fn test_cleanup_keeps_recent_inputs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mdmerge-live.md"), "x").unwrap();

        let removed = cleanup_stale_inputs(temp.path(), STALE_INPUT_AGE).unwrap();

        assert_eq!(removed, 0);
        assert!(temp.path().join("mdmerge-live.md").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let temp = TempDir::new().unwrap();
        let removed = cleanup_stale_inputs(&temp.path().join("gone"), Duration::ZERO).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_create_input_writes_text() {
        let input = create_input("# merged\n").unwrap();
        let name = input.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(is_transient_input(&name));
        assert_eq!(fs::read_to_string(input.path()).unwrap(), "# merged\n");

        let path = input.path().to_path_buf();
        drop(input);
        assert!(!path.exists());
    }
}
