//! Concatenation of located documents into one merged text.

use crate::document::locator::DocumentSet;
use crate::document::resolver::{MissingReference, ReferenceResolver};
use crate::errors::MergeError;
use crate::variant::RenderOptions;
use std::fs;
use std::path::Path;
use tracing::info;

/// Marker placed between two documents.
pub const SECTION_SEPARATOR: &str = "---";

/// Merged text plus the diagnostics collected while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDocument {
    pub text: String,
    /// Header of each section, in output order
    pub headers: Vec<String>,
    pub missing: Vec<MissingReference>,
}

impl AggregatedDocument {
    pub fn section_count(&self) -> usize {
        self.headers.len()
    }
}

/// Merges a [`DocumentSet`] for one output variant.
pub struct Aggregator<'a> {
    options: &'a RenderOptions,
}

impl<'a> Aggregator<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    /// Read, resolve and concatenate every document in set order.
    ///
    /// Each document contributes exactly one section:
    /// `\n\n---\n\n# <header>\n\n<body>\n`.
    ///
    /// # Errors
    ///
    /// Fails with [`MergeError::Io`] if a document cannot be read as UTF-8.
    pub fn aggregate(&self, set: &DocumentSet) -> Result<AggregatedDocument, MergeError> {
        let resolver = ReferenceResolver::new(self.options);
        let total = set.len();
        let mut text = String::new();
        let mut headers = Vec::with_capacity(total);
        let mut missing = Vec::new();

        for (i, doc_path) in set.iter().enumerate() {
            info!(
                "merging {}/{}: {}",
                i + 1,
                total,
                doc_path
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default()
            );

            let content =
                fs::read_to_string(doc_path).map_err(|e| MergeError::io(doc_path, e))?;
            let resolved = resolver.resolve_document(&content, doc_path);
            let header = self
                .options
                .escape_header(&relative_header(set.root(), doc_path));

            append_section(&mut text, &header, &resolved.text);
            headers.push(header);
            missing.extend(resolved.missing);
        }

        Ok(AggregatedDocument {
            text,
            headers,
            missing,
        })
    }
}

fn append_section(acc: &mut String, header: &str, body: &str) {
    acc.push_str("\n\n");
    acc.push_str(SECTION_SEPARATOR);
    acc.push_str("\n\n# ");
    acc.push_str(header);
    acc.push_str("\n\n");
    acc.push_str(body);
    acc.push('\n');
}

/// Path of `doc` relative to `root`, joined with `/` on every platform.
///
/// Falls back to the full path when `doc` is not under `root`.
pub fn relative_header(root: &Path, doc: &Path) -> String {
    let rel = doc.strip_prefix(root).unwrap_or(doc);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::OutputVariant;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_relative_header() {
        assert_eq!(
            relative_header(Path::new("/r"), Path::new("/r/a/b/c.md")),
            "a/b/c.md"
        );
        assert_eq!(relative_header(Path::new("/r"), Path::new("/r/c.md")), "c.md");
    }

    #[test]
    fn test_aggregate_sections_in_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b.md", "Bee");
        write(temp.path(), "a/one.md", "One\n");

        let set = DocumentSet::locate(temp.path()).unwrap();
        let options = RenderOptions::new(OutputVariant::WordProcessor);
        let merged = Aggregator::new(&options).aggregate(&set).unwrap();

        assert_eq!(
            merged.text,
            "\n\n---\n\n# a/one.md\n\nOne\n\n\n---\n\n# b.md\n\nBee\n"
        );
        assert_eq!(merged.headers, vec!["a/one.md", "b.md"]);
        assert_eq!(merged.section_count(), 2);
    }

    #[test]
    fn test_typesetting_headers_are_escaped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "my_notes/first_draft.md", "x");

        let set = DocumentSet::locate(temp.path()).unwrap();
        let options = RenderOptions::new(OutputVariant::Typesetting);
        let merged = Aggregator::new(&options).aggregate(&set).unwrap();

        assert!(merged.text.contains(r"# my\_notes/first\_draft.md"));
    }

    #[test]
    fn test_missing_references_collected_across_documents() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "![x](gone.png)");
        write(temp.path(), "sub/b.md", "ok\n![y](../also-gone.png)");
        write(temp.path(), "img.png", "");
        write(temp.path(), "c.md", "![z](img.png)");

        let set = DocumentSet::locate(temp.path()).unwrap();
        let options = RenderOptions::new(OutputVariant::Typesetting);
        let merged = Aggregator::new(&options).aggregate(&set).unwrap();

        assert_eq!(merged.missing.len(), 2);
        assert_eq!(merged.missing[0].target, "gone.png");
        assert_eq!(merged.missing[1].target, "../also-gone.png");
        assert_eq!(merged.missing[1].line_number, 2);
        assert_eq!(merged.section_count(), 3);
    }
}
