//! Media reference recognition.
//!
//! Only one construct is recognised: `![description](target)` on a single
//! line. Matching is intentionally simple. The target runs from the first
//! `](` on the line to the first `)` after it, so a target containing `)`
//! is cut short and a second image on the same line is left alone.

use std::ops::Range;

/// Schemes that mark a target as a network resource. Compared
/// case-insensitively against the start of the target.
pub const REMOTE_SCHEMES: &[&str] = &["http://", "https://"];

/// Where a reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Scheme-qualified network resource, never rewritten
    Remote,
    /// Path relative to the owning document's directory
    Local,
}

/// A media reference found on one line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference<'a> {
    /// Text between `![` and `](`, empty if the `![` follows the `](`
    pub description: &'a str,
    /// Target with surrounding whitespace removed
    pub target: &'a str,
    /// Byte range of the raw target, between `](` and `)`
    pub target_span: Range<usize>,
    pub kind: ReferenceKind,
}

impl MediaReference<'_> {
    /// Byte offset of the closing `)`.
    pub fn close_paren(&self) -> usize {
        self.target_span.end
    }
}

/// Classify a target string.
pub fn classify(target: &str) -> ReferenceKind {
    let lowered = target.to_lowercase();
    if REMOTE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Local
    }
}

/// Find the media reference on a line, if any.
///
/// # Example
///
/// ```
/// use mdmerge::document::{scan_line, ReferenceKind};
///
/// let r = scan_line("see ![plot](../img/p.png) here").unwrap();
/// assert_eq!(r.description, "plot");
/// assert_eq!(r.target, "../img/p.png");
/// assert_eq!(r.kind, ReferenceKind::Local);
/// ```
pub fn scan_line(line: &str) -> Option<MediaReference<'_>> {
    if !line.contains("![") {
        return None;
    }
    let start = line.find("](")?;
    let end = start + 2 + line[start + 2..].find(')')?;

    let description = line[..start]
        .rfind("![")
        .map(|open| &line[open + 2..start])
        .unwrap_or("");
    let target = line[start + 2..end].trim();

    Some(MediaReference {
        description,
        target,
        target_span: start + 2..end,
        kind: classify(target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_image() {
        let r = scan_line("![Logo](./logo.png)").unwrap();
        assert_eq!(r.description, "Logo");
        assert_eq!(r.target, "./logo.png");
        assert_eq!(r.target_span, 8..18);
        assert_eq!(r.close_paren(), 18);
        assert_eq!(r.kind, ReferenceKind::Local);
    }

    #[test]
    fn test_scan_trims_target() {
        let r = scan_line("![a](  img/a b.png )").unwrap();
        assert_eq!(r.target, "img/a b.png");
    }

    #[test]
    fn test_plain_link_is_not_media() {
        assert!(scan_line("see [doc](other.md)").is_none());
        assert!(scan_line("no references here").is_none());
    }

    #[test]
    fn test_missing_close_paren_is_skipped() {
        assert!(scan_line("![broken](img/a.png").is_none());
        // A `)` before the `](` does not count.
        assert!(scan_line(") ![broken](img/a.png").is_none());
    }

    #[test]
    fn test_first_reference_only() {
        let r = scan_line("![a](one.png) and ![b](two.png)").unwrap();
        assert_eq!(r.target, "one.png");
    }

    #[test]
    fn test_paren_in_target_truncates() {
        let r = scan_line("![a](img/photo(1).png)").unwrap();
        assert_eq!(r.target, "img/photo(1");
    }

    #[test]
    fn test_classify_schemes() {
        assert_eq!(classify("http://x/a.png"), ReferenceKind::Remote);
        assert_eq!(classify("HTTPS://x/a.png"), ReferenceKind::Remote);
        assert_eq!(classify("ftp://x/a.png"), ReferenceKind::Local);
        assert_eq!(classify("img/a.png#frag"), ReferenceKind::Local);
        assert_eq!(classify("img/a.png?x=1"), ReferenceKind::Local);
    }

    #[test]
    fn test_multibyte_text_around_reference() {
        let r = scan_line("图片：![示意图](图/甲.png)。").unwrap();
        assert_eq!(r.description, "示意图");
        assert_eq!(r.target, "图/甲.png");
    }
}
