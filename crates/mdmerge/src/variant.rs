//! Output variant descriptor.
//!
//! The merged text is shaped differently depending on what the converter will
//! produce from it. A word-processor document wants native Windows-style paths
//! and no escaping; the typesetting engine treats backslash as an escape
//! introducer, needs `_` escaped in headers, and benefits from size hints on
//! every image so oversized media cannot overflow a page.

use std::fmt;
use std::str::FromStr;

/// Target of a merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputVariant {
    /// `.docx` output
    WordProcessor,
    /// `.pdf` output through a LaTeX or HTML engine
    Typesetting,
}

impl OutputVariant {
    /// Path separator the converter expects inside image targets.
    pub fn path_style(&self) -> PathStyle {
        match self {
            OutputVariant::WordProcessor => PathStyle::Backslash,
            OutputVariant::Typesetting => PathStyle::ForwardSlash,
        }
    }

    /// Whether synthesized section headers need `_` and `\` escaped.
    pub fn escapes_headers(&self) -> bool {
        matches!(self, OutputVariant::Typesetting)
    }

    /// Whether image references receive a dimension-annotation block.
    pub fn annotates_media(&self) -> bool {
        matches!(self, OutputVariant::Typesetting)
    }

    /// Output format token understood by pandoc.
    pub fn format_token(&self) -> &'static str {
        match self {
            OutputVariant::WordProcessor => "docx",
            OutputVariant::Typesetting => "pdf",
        }
    }

    /// File name used when no explicit output path is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputVariant::WordProcessor => "knowledgebase.docx",
            OutputVariant::Typesetting => "knowledgebase.pdf",
        }
    }

    /// The typesetting engines read from a file; docx conversion reads stdin.
    pub fn requires_input_file(&self) -> bool {
        matches!(self, OutputVariant::Typesetting)
    }
}

impl fmt::Display for OutputVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_token())
    }
}

impl FromStr for OutputVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" | "word" => Ok(OutputVariant::WordProcessor),
            "pdf" | "latex" => Ok(OutputVariant::Typesetting),
            other => Err(format!(
                "Invalid variant '{}': expected 'docx' or 'pdf'",
                other
            )),
        }
    }
}

/// Separator convention for rewritten absolute paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStyle {
    /// `C:\notes\img\a.png`
    Backslash,
    /// `C:/notes/img/a.png`
    ForwardSlash,
}

impl PathStyle {
    /// Render a path string using this separator convention.
    pub fn render(&self, path: &str) -> String {
        match self {
            PathStyle::Backslash => path.replace('/', "\\"),
            PathStyle::ForwardSlash => path.replace('\\', "/"),
        }
    }
}

/// Upper bounds for rendered media, as LaTeX lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBounds {
    pub max_width: String,
    pub max_height: String,
}

impl Default for MediaBounds {
    fn default() -> Self {
        Self {
            max_width: r"0.9\textwidth".to_string(),
            max_height: r"0.8\textheight".to_string(),
        }
    }
}

impl MediaBounds {
    /// Attribute block appended after an image reference.
    pub fn annotation(&self) -> String {
        format!(
            "{{width={}, height={}, keepaspectratio}}",
            self.max_width, self.max_height
        )
    }

    /// Value for pandoc's `graphicxopts` template variable.
    pub fn graphicx_options(&self) -> String {
        format!(
            "width={}, height={}, keepaspectratio",
            self.max_width, self.max_height
        )
    }
}

/// Everything the resolver and aggregator need to know about the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub variant: OutputVariant,
    pub path_style: PathStyle,
    pub bounds: MediaBounds,
}

impl RenderOptions {
    /// Options with the variant's own separator convention and default bounds.
    pub fn new(variant: OutputVariant) -> Self {
        Self {
            variant,
            path_style: variant.path_style(),
            bounds: MediaBounds::default(),
        }
    }

    pub fn with_path_style(mut self, style: PathStyle) -> Self {
        self.path_style = style;
        self
    }

    pub fn with_bounds(mut self, bounds: MediaBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Escape characters the typesetting engine treats as markup in headers.
    ///
    /// Backslash goes first so the escapes introduced for `_` stay intact.
    pub fn escape_header(&self, header: &str) -> String {
        if !self.variant.escapes_headers() {
            return header.to_string();
        }
        header.replace('\\', r"\\").replace('_', r"\_")
    }

    /// Annotation block to append, if this variant annotates media.
    pub fn annotation(&self) -> Option<String> {
        self.variant
            .annotates_media()
            .then(|| self.bounds.annotation())
    }
}
