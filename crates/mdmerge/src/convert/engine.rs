//! PDF engine discovery.
//!
//! Discovery is a presence check on the search path, behind the
//! [`EngineProbe`] trait so callers and tests can substitute their own.

use crate::errors::MergeError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Engines pandoc can drive to produce a PDF, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdfEngine {
    /// XeLaTeX, handles CJK fonts
    Xelatex,
    /// Lightweight HTML-based fallback
    Wkhtmltopdf,
}

impl PdfEngine {
    pub const ALL: [PdfEngine; 2] = [PdfEngine::Xelatex, PdfEngine::Wkhtmltopdf];

    pub fn executable(&self) -> &'static str {
        match self {
            PdfEngine::Xelatex => "xelatex",
            PdfEngine::Wkhtmltopdf => "wkhtmltopdf",
        }
    }
}

impl fmt::Display for PdfEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

impl FromStr for PdfEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xelatex" => Ok(PdfEngine::Xelatex),
            "wkhtmltopdf" => Ok(PdfEngine::Wkhtmltopdf),
            other => Err(format!(
                "Unknown PDF engine '{}': expected 'xelatex' or 'wkhtmltopdf'",
                other
            )),
        }
    }
}

/// Answers whether an executable can be found.
pub trait EngineProbe {
    fn is_available(&self, executable: &str) -> bool;
}

/// Probe backed by the `PATH` lookup of the `which` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProbe;

impl EngineProbe for PathProbe {
    fn is_available(&self, executable: &str) -> bool {
        which::which(executable).is_ok()
    }
}

/// Probe with a fixed answer set.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    available: HashSet<String>,
}

impl StaticProbe {
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
        }
    }
}

impl EngineProbe for StaticProbe {
    fn is_available(&self, executable: &str) -> bool {
        self.available.contains(executable)
    }
}

/// Pick the engine to use.
///
/// With a preference, only that engine is considered. Otherwise the first
/// available engine from [`PdfEngine::ALL`] wins.
///
/// # Errors
///
/// [`MergeError::EngineUnavailable`] when no candidate is present.
pub fn select_pdf_engine(
    probe: &dyn EngineProbe,
    preferred: Option<PdfEngine>,
) -> Result<PdfEngine, MergeError> {
    let candidates: Vec<PdfEngine> = match preferred {
        Some(engine) => vec![engine],
        None => PdfEngine::ALL.to_vec(),
    };

    for engine in &candidates {
        if probe.is_available(engine.executable()) {
            info!("Using PDF engine: {}", engine);
            return Ok(*engine);
        }
    }

    Err(MergeError::EngineUnavailable {
        candidates: candidates
            .iter()
            .map(|e| e.executable().to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_xelatex() {
        let probe = StaticProbe::new(["xelatex", "wkhtmltopdf"]);
        assert_eq!(select_pdf_engine(&probe, None).unwrap(), PdfEngine::Xelatex);
    }

    #[test]
    fn test_falls_back_to_wkhtmltopdf() {
        let probe = StaticProbe::new(["wkhtmltopdf"]);
        assert_eq!(
            select_pdf_engine(&probe, None).unwrap(),
            PdfEngine::Wkhtmltopdf
        );
    }

    #[test]
    fn test_no_engine_is_error() {
        let probe = StaticProbe::default();
        let err = select_pdf_engine(&probe, None).unwrap_err();
        match err {
            MergeError::EngineUnavailable { candidates } => {
                assert_eq!(candidates, vec!["xelatex", "wkhtmltopdf"]);
            }
            other => panic!("Expected EngineUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_preferred_engine_must_be_present() {
        let probe = StaticProbe::new(["xelatex"]);
        let err = select_pdf_engine(&probe, Some(PdfEngine::Wkhtmltopdf)).unwrap_err();
        assert!(matches!(err, MergeError::EngineUnavailable { .. }));
        assert_eq!(
            select_pdf_engine(&probe, Some(PdfEngine::Xelatex)).unwrap(),
            PdfEngine::Xelatex
        );
    }

    #[test]
    fn test_parse_engine() {
        assert_eq!("XeLaTeX".parse::<PdfEngine>().unwrap(), PdfEngine::Xelatex);
        assert!("pdflatex".parse::<PdfEngine>().is_err());
    }
}
