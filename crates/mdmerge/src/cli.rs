//! Command-line interface definitions using clap.

use crate::convert::PdfEngine;
use crate::variant::OutputVariant;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Markdown knowledge-base merger
///
/// Merges every `.md` file under a folder into one document, in path order,
/// with a section per file. Relative image paths are rewritten to absolute
/// paths so pandoc can still find them.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or configuration
///   3  - No Markdown documents found
///   4  - Broken media references found (check)
///  10  - External dependency failed (pandoc, PDF engine, file system)
/// 130  - Interrupted while converting
#[derive(Parser, Debug)]
#[command(name = "mdmerge")]
#[command(version, about = "Merge a tree of Markdown notes into one document", long_about = None)]
pub struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print debug output, including the converter command line
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Configuration file (default: <ROOT>/mdmerge.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert to a Word document (.docx)
    Docx {
        /// Folder containing the Markdown notes
        root: PathBuf,

        /// Output file (default: <ROOT>/knowledgebase.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert to PDF via xelatex, falling back to wkhtmltopdf
    Pdf {
        /// Folder containing the Markdown notes
        root: PathBuf,

        /// Output file (default: <ROOT>/knowledgebase.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Use this engine only (xelatex, wkhtmltopdf)
        #[arg(long)]
        engine: Option<PdfEngine>,
    },

    /// Write the merged Markdown without converting it
    Merge {
        /// Folder containing the Markdown notes
        root: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Shape the text for this target (docx, pdf)
        #[arg(long, default_value = "pdf")]
        variant: OutputVariant,
    },

    /// Report image references that point at missing files
    Check {
        /// Folder containing the Markdown notes
        root: PathBuf,
    },

    /// Show which converter and PDF engines are installed
    Engines,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pdf_with_engine() {
        let cli = Cli::parse_from(["mdmerge", "pdf", "notes", "--engine", "wkhtmltopdf"]);
        match cli.command {
            Commands::Pdf {
                root,
                output,
                engine,
            } => {
                assert_eq!(root, PathBuf::from("notes"));
                assert!(output.is_none());
                assert_eq!(engine, Some(PdfEngine::Wkhtmltopdf));
            }
            other => panic!("Expected pdf command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_merge_defaults_to_pdf_variant() {
        let cli = Cli::parse_from(["mdmerge", "-q", "merge", "notes"]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Merge { variant, .. } => assert_eq!(variant, OutputVariant::Typesetting),
            other => panic!("Expected merge command, got {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mdmerge", "-q", "-v", "engines"]).is_err());
    }
}
