//! Media reference rewriting.
//!
//! Once documents are concatenated, a relative image path no longer has a
//! folder to be relative to. The resolver rewrites each local target into an
//! absolute path based on the owning document's own directory (never the merge
//! root), renders it with the separator the converter expects, and optionally
//! appends a size annotation.

use crate::document::reference::{scan_line, ReferenceKind};
use crate::variant::RenderOptions;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// A local reference whose resolved path does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    pub document: PathBuf,
    /// 1-based
    pub line_number: usize,
    /// Target as written in the document
    pub target: String,
    /// Absolute path the target resolved to
    pub resolved: PathBuf,
}

/// Output of resolving one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub text: String,
    pub missing: Vec<MissingReference>,
}

/// Rewrites media references for one output variant.
pub struct ReferenceResolver<'a> {
    options: &'a RenderOptions,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    /// Rewrite every line of `text`, a document stored at `doc_path`.
    ///
    /// Lines are split on `\n` or `\r\n` and joined with `\n`, so a trailing
    /// newline is not preserved. Missing local targets are logged and
    /// returned, never raised.
    pub fn resolve_document(&self, text: &str, doc_path: &Path) -> ResolvedDocument {
        let doc_dir = doc_path.parent().unwrap_or(Path::new(""));
        let mut missing = Vec::new();

        let lines: Vec<String> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| self.rewrite_line(line, doc_path, doc_dir, idx + 1, &mut missing))
            .collect();

        ResolvedDocument {
            text: lines.join("\n"),
            missing,
        }
    }

    fn rewrite_line(
        &self,
        line: &str,
        doc_path: &Path,
        doc_dir: &Path,
        line_number: usize,
        missing: &mut Vec<MissingReference>,
    ) -> String {
        let Some(reference) = scan_line(line) else {
            return line.to_string();
        };

        let (mut rewritten, close) = match reference.kind {
            ReferenceKind::Remote => (line.to_string(), reference.close_paren()),
            ReferenceKind::Local => {
                let resolved = resolve_target(doc_dir, reference.target);
                if !check_exists(&resolved) {
                    missing.push(MissingReference {
                        document: doc_path.to_path_buf(),
                        line_number,
                        target: reference.target.to_string(),
                        resolved: resolved.clone(),
                    });
                }

                let rendered = self.options.path_style.render(&resolved.to_string_lossy());
                let mut out = String::with_capacity(line.len() + rendered.len());
                out.push_str(&line[..reference.target_span.start]);
                out.push_str(&rendered);
                let close = out.len();
                out.push_str(&line[reference.target_span.end..]);
                (out, close)
            }
        };

        if let Some(annotation) = self.options.annotation() {
            if !rewritten.contains('{') {
                rewritten.insert_str(close + 1, &annotation);
            }
        }
        rewritten
    }
}

/// Resolve a local target against the directory of its document.
///
/// The result is absolute (relative inputs are anchored at the current
/// working directory) and lexically normalized. No containment check is made:
/// targets may point outside the merge root.
pub fn resolve_target(doc_dir: &Path, target: &str) -> PathBuf {
    let joined = doc_dir.join(target);
    let absolute = std::path::absolute(&joined).unwrap_or(joined);
    normalize_path(&absolute)
}

/// Existence check for a resolved path, warning when it is missing.
pub fn check_exists(resolved: &Path) -> bool {
    if resolved.exists() {
        return true;
    }
    warn!("Image file not found: {}", resolved.display());
    false
}

/// Normalize a path by resolving `.` and `..` components without touching
/// the filesystem. `..` never climbs above the root or a drive prefix.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }
    components.iter().collect()
}
