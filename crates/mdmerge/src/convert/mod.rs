//! Hand-off to the external converter.
//!
//! The engine produces one merged text; turning it into `.docx` or `.pdf` is
//! pandoc's job. This module defines the [`Converter`] seam, the pandoc
//! implementation, PDF engine discovery, transient input handling and the
//! directive lists each variant passes along.

mod engine;
mod interrupt;
mod pandoc;
mod transient;

pub use engine::{select_pdf_engine, EngineProbe, PathProbe, PdfEngine, StaticProbe};
pub use pandoc::{default_output_path, PandocConverter};
pub use transient::{cleanup_stale_inputs, is_transient_input, STALE_INPUT_AGE};

use crate::config::MergeConfig;
use crate::errors::MergeError;
use crate::variant::{MediaBounds, OutputVariant, PathStyle};
use std::path::Path;

/// Everything a converter needs for one run.
#[derive(Debug, Clone)]
pub struct ConversionRequest<'a> {
    /// Merged Markdown text
    pub text: &'a str,
    /// Output format token (`docx`, `pdf`)
    pub format: &'a str,
    pub output: &'a Path,
    pub directives: &'a [String],
    /// Hand the text over as a transient file instead of stdin
    pub use_input_file: bool,
}

/// Turns merged text into an output artifact.
pub trait Converter {
    /// Produce `request.output` or fail. A failed run leaves no new artifact.
    fn convert(&self, request: &ConversionRequest<'_>) -> Result<(), MergeError>;
}

/// Extra arguments for the converter.
///
/// Both variants get `--standalone` and a resource search root so assets
/// referenced by bare file name are still found. The typesetting variant adds
/// table of contents, page geometry, a global image bound, the engine, and for
/// xelatex the font families.
pub fn build_directives(
    variant: OutputVariant,
    engine: Option<PdfEngine>,
    root: &Path,
    config: &MergeConfig,
    bounds: &MediaBounds,
) -> Vec<String> {
    let root = root.to_string_lossy();
    let mut directives = vec!["--standalone".to_string()];

    match variant {
        OutputVariant::WordProcessor => {
            directives.push(format!("--resource-path={}", root));
        }
        OutputVariant::Typesetting => {
            directives.push(format!(
                "--resource-path={}",
                PathStyle::ForwardSlash.render(&root)
            ));
            directives.push("--toc".to_string());
            directives.push(format!("--toc-depth={}", config.toc_depth()));
            if let Some(engine) = engine {
                directives.push("--pdf-engine".to_string());
                directives.push(engine.executable().to_string());
            }
            push_variable(&mut directives, &format!("geometry:{}", config.paper()));
            push_variable(&mut directives, &format!("margin={}", config.margin()));
            push_variable(
                &mut directives,
                &format!("graphicxopts={}", bounds.graphicx_options()),
            );

            if engine == Some(PdfEngine::Xelatex) {
                push_variable(&mut directives, &format!("mainfont={}", config.main_font()));
                push_variable(&mut directives, &format!("sansfont={}", config.sans_font()));
                push_variable(&mut directives, &format!("monofont={}", config.mono_font()));
                push_variable(
                    &mut directives,
                    &format!("CJKmainfont={}", config.cjk_main_font()),
                );
                push_variable(
                    &mut directives,
                    &format!("geometry=margin={}", config.margin()),
                );
            }
        }
    }

    directives
}

fn push_variable(directives: &mut Vec<String>, value: &str) {
    directives.push("--variable".to_string());
    directives.push(value.to_string());
}
