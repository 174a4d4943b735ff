//! Markdown knowledge-base merger
//!
//! Aggregates a directory tree of Markdown notes into one document, rewriting
//! image references so they still resolve once the notes leave their folders,
//! and hands the result to pandoc for `.docx` or `.pdf` output.
//!
//! # Example
//!
//! ```no_run
//! use mdmerge::{MergeConfig, OutputVariant, Pipeline};
//! use std::path::Path;
//!
//! let pipeline = Pipeline::new(Path::new("notes"), MergeConfig::default()).unwrap();
//! let merged = pipeline.merge(OutputVariant::Typesetting).unwrap();
//! println!("{} sections", merged.section_count());
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod document;
pub mod errors;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod variant;

// Re-export commonly used types
pub use config::MergeConfig;
pub use document::{AggregatedDocument, DocumentSet, MissingReference};
pub use errors::MergeError;
pub use output::ExitCode;
pub use pipeline::{ConversionReport, Pipeline};
pub use variant::{OutputVariant, PathStyle, RenderOptions};
