//! Error types and actionable error formatting.
//!
//! `MergeError` covers every condition that aborts a merge pass. Broken media
//! references are deliberately absent: they are logged and recorded as
//! [`MissingReference`](crate::document::MissingReference) values, never raised.
//!
//! `ActionableError` wraps a terminal error with possible causes and
//! remediation steps so the CLI can tell the user what to do next.

use crate::output::ExitCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a merge pass.
#[derive(Debug, Error)]
pub enum MergeError {
    /// No `.md` file anywhere under the root.
    #[error("No Markdown documents found under {}", root.display())]
    NoDocuments { root: PathBuf },

    /// Neither typesetting engine is on the search path.
    #[error("No PDF engine available (looked for: {})", candidates.join(", "))]
    EngineUnavailable { candidates: Vec<String> },

    /// The converter ran and failed, or could not be started.
    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    /// SIGINT or SIGTERM arrived while the converter was running.
    #[error("Interrupted while running {program}")]
    Interrupted { program: String },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl MergeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            MergeError::NoDocuments { .. } => ExitCode::NotFound,
            MergeError::EngineUnavailable { .. } | MergeError::Conversion { .. } => {
                ExitCode::ExternalError
            }
            MergeError::Io { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ExitCode::NotFound,
                _ => ExitCode::ExternalError,
            },
            MergeError::Config { .. } => ExitCode::InvalidArgument,
            MergeError::Interrupted { .. } => ExitCode::Interrupted,
        }
    }

    /// Attach causes and remedies where the user can act on them.
    pub fn to_actionable(&self) -> ActionableError {
        match self {
            MergeError::NoDocuments { root } => no_documents_found(root),
            MergeError::EngineUnavailable { .. } => no_pdf_engine(),
            other => ActionableError::new(other.to_string()),
        }
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use mdmerge::errors::ActionableError;
///
/// let error = ActionableError::new("pandoc exited with status 83")
///     .with_cause("An image referenced by the notes could not be loaded")
///     .with_remedy("Run: mdmerge check <root>");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

pub fn no_documents_found(root: &std::path::Path) -> ActionableError {
    ActionableError::new(format!(
        "No Markdown documents found under {}",
        root.display()
    ))
    .with_cause("The directory is empty or contains no files ending in .md")
    .with_cause("The wrong directory was given")
    .with_remedy(format!("List the directory: ls -R {}", root.display()))
    .with_remedy("Pass the folder that holds your notes: mdmerge docx <root>")
}

pub fn no_pdf_engine() -> ActionableError {
    ActionableError::new("No PDF engine available")
        .with_cause("Neither xelatex nor wkhtmltopdf is installed")
        .with_cause("The engine is installed but not on PATH")
        .with_remedy("Install a TeX distribution with xelatex (MiKTeX, TeX Live)")
        .with_remedy("Or install wkhtmltopdf: https://wkhtmltopdf.org/downloads.html")
        .with_remedy("Check what is detected: mdmerge engines")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_actionable_error_formatting() {
        let error = ActionableError::new("Test error")
            .with_cause("First cause")
            .with_remedy("First remedy");

        let msg = error.to_error_message();

        assert!(msg.contains("Error: Test error"));
        assert!(msg.contains("Possible causes:"));
        assert!(msg.contains("• First cause"));
        assert!(msg.contains("To fix:"));
        assert!(msg.contains("• First remedy"));
    }

    #[test]
    fn test_error_without_causes() {
        let msg = ActionableError::new("Simple error").to_error_message();
        assert!(msg.contains("Error: Simple error"));
        assert!(!msg.contains("Possible causes:"));
        assert!(!msg.contains("To fix:"));
    }

    #[test]
    fn test_no_documents_helper() {
        let msg = no_documents_found(Path::new("/notes")).to_error_message();
        assert!(msg.contains("No Markdown documents found under /notes"));
        assert!(msg.contains(".md"));
    }

    #[test]
    fn test_no_engine_helper() {
        let msg = no_pdf_engine().to_error_message();
        assert!(msg.contains("xelatex"));
        assert!(msg.contains("wkhtmltopdf"));
        assert!(msg.contains("mdmerge engines"));
    }

    #[test]
    fn test_exit_codes() {
        let err = MergeError::NoDocuments {
            root: PathBuf::from("/x"),
        };
        assert_eq!(err.exit_code(), ExitCode::NotFound);

        let err = MergeError::EngineUnavailable {
            candidates: vec!["xelatex".into(), "wkhtmltopdf".into()],
        };
        assert_eq!(err.exit_code(), ExitCode::ExternalError);
        assert_eq!(
            err.to_string(),
            "No PDF engine available (looked for: xelatex, wkhtmltopdf)"
        );

        let err = MergeError::Conversion {
            message: "boom".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::ExternalError);

        let err = MergeError::Interrupted {
            program: "pandoc".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::Interrupted);
    }
}
