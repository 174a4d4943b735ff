//! Document aggregation engine
//!
//! Locates Markdown documents under a root, rewrites their media references so
//! they survive concatenation, and merges them into one text with a section per
//! source document.

mod aggregator;
mod locator;
mod reference;
mod resolver;

pub use aggregator::{relative_header, AggregatedDocument, Aggregator, SECTION_SEPARATOR};
pub use locator::{is_document, suspicious_chars, DocumentSet, DOCUMENT_EXTENSION};
pub use reference::{classify, scan_line, MediaReference, ReferenceKind, REMOTE_SCHEMES};
pub use resolver::{
    check_exists, normalize_path, resolve_target, MissingReference, ReferenceResolver,
    ResolvedDocument,
};
