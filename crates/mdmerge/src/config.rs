//! Configuration file loading and parsing.
//!
//! A merge root may carry an `mdmerge.toml`. If no config file exists, the
//! system falls back to defaults matching the built-in variant behavior.

use crate::errors::MergeError;
use crate::variant::{MediaBounds, OutputVariant, PathStyle, RenderOptions};
use serde::Deserialize;
use std::path::Path;

/// Name of the per-root config file.
pub const CONFIG_FILE_NAME: &str = "mdmerge.toml";

/// Root configuration structure loaded from `mdmerge.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Image size bounds for the typesetting variant (optional).
    pub media: Option<MediaConfig>,
    /// Path separator overrides (optional).
    pub paths: Option<PathsConfig>,
    /// PDF layout and fonts (optional).
    pub pdf: Option<PdfConfig>,
    /// Converter executable (optional).
    pub converter: Option<ConverterConfig>,
}

/// Image bounds as LaTeX lengths.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    pub max_width: Option<String>,
    pub max_height: Option<String>,
}

/// Separator convention for rewritten paths.
///
/// `separator` applies to both variants; the per-variant keys take precedence.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub separator: Option<SeparatorSetting>,
    pub docx_separator: Option<SeparatorSetting>,
    pub pdf_separator: Option<SeparatorSetting>,
}

/// Separator choice in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorSetting {
    /// Whatever the variant uses by default
    Native,
    Backslash,
    Forward,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PdfConfig {
    /// Table of contents depth (default: 3).
    pub toc_depth: Option<u8>,
    /// Paper size for the geometry package (default: "a4paper").
    pub paper: Option<String>,
    /// Page margin (default: "1in").
    pub margin: Option<String>,
    pub main_font: Option<String>,
    pub sans_font: Option<String>,
    pub mono_font: Option<String>,
    pub cjk_main_font: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterConfig {
    /// Converter executable name or path (default: "pandoc").
    pub program: Option<String>,
}

impl MergeConfig {
    /// Load `mdmerge.toml` from a merge root if it exists.
    ///
    /// Returns an empty config (all fields None) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(root: &Path) -> Result<Self, MergeError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(MergeConfig::default());
        }
        Self::load_file(&config_path)
    }

    /// Load an explicit config file. The file must exist.
    pub fn load_file(config_path: &Path) -> Result<Self, MergeError> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| MergeError::io(config_path, e))?;

        toml::from_str(&content).map_err(|e| MergeError::Config {
            path: config_path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn media_bounds(&self) -> MediaBounds {
        let defaults = MediaBounds::default();
        match &self.media {
            Some(media) => MediaBounds {
                max_width: media.max_width.clone().unwrap_or(defaults.max_width),
                max_height: media.max_height.clone().unwrap_or(defaults.max_height),
            },
            None => defaults,
        }
    }

    /// Separator for a variant after applying overrides.
    pub fn path_style(&self, variant: OutputVariant) -> PathStyle {
        let setting = self.paths.as_ref().and_then(|p| {
            let specific = match variant {
                OutputVariant::WordProcessor => p.docx_separator,
                OutputVariant::Typesetting => p.pdf_separator,
            };
            specific.or(p.separator)
        });
        match setting {
            Some(SeparatorSetting::Backslash) => PathStyle::Backslash,
            Some(SeparatorSetting::Forward) => PathStyle::ForwardSlash,
            Some(SeparatorSetting::Native) | None => variant.path_style(),
        }
    }

    /// Render options for a variant with every override applied.
    pub fn render_options(&self, variant: OutputVariant) -> RenderOptions {
        RenderOptions::new(variant)
            .with_path_style(self.path_style(variant))
            .with_bounds(self.media_bounds())
    }

    pub fn toc_depth(&self) -> u8 {
        self.pdf.as_ref().and_then(|p| p.toc_depth).unwrap_or(3)
    }

    pub fn paper(&self) -> String {
        self.pdf_field(|p| p.paper.clone(), "a4paper")
    }

    pub fn margin(&self) -> String {
        self.pdf_field(|p| p.margin.clone(), "1in")
    }

    pub fn main_font(&self) -> String {
        self.pdf_field(|p| p.main_font.clone(), "Microsoft YaHei")
    }

    pub fn sans_font(&self) -> String {
        self.pdf_field(|p| p.sans_font.clone(), "SimHei")
    }

    pub fn mono_font(&self) -> String {
        self.pdf_field(|p| p.mono_font.clone(), "Consolas")
    }

    pub fn cjk_main_font(&self) -> String {
        self.pdf_field(|p| p.cjk_main_font.clone(), "Microsoft YaHei")
    }

    pub fn converter_program(&self) -> String {
        self.converter
            .as_ref()
            .and_then(|c| c.program.clone())
            .unwrap_or_else(|| "pandoc".to_string())
    }

    fn pdf_field(&self, get: impl Fn(&PdfConfig) -> Option<String>, default: &str) -> String {
        self.pdf
            .as_ref()
            .and_then(get)
            .unwrap_or_else(|| default.to_string())
    }
}
