//! Exit codes and plain-text output helpers for the CLI.

use std::fmt::Display;
use std::io::{self, Write};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments or usage error (2)
    InvalidArgument = 2,

    /// No input documents found (3)
    NotFound = 3,

    /// Broken media references reported by `check` (4)
    ValidationFailed = 4,

    /// External dependency failed - converter, engine, file system (10)
    ExternalError = 10,

    /// Stopped by SIGINT/SIGTERM (130)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Command succeeded",
            ExitCode::GenericError => "Generic error occurred",
            ExitCode::InvalidArgument => "Invalid arguments or usage error",
            ExitCode::NotFound => "No Markdown documents found under the root",
            ExitCode::ValidationFailed => "Broken media references found",
            ExitCode::ExternalError => "External dependency failed (pandoc, PDF engine, file system)",
            ExitCode::Interrupted => "Interrupted",
        }
    }
}

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
}

impl OutputContext {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print essential output (always shown)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe(&format!("{}", msg))
    }

    /// Print text exactly as given, without a trailing newline
    pub fn print_raw(&self, text: &str) -> io::Result<()> {
        write_safe(text)
    }

    /// Print success message (suppressed by --quiet)
    pub fn print_success(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print error (always shown to stderr)
    pub fn print_error(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe_stderr(&format!("{}", msg))
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    write_safe(&format!("{}\n", msg))
}

fn write_safe(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Silently exit on broken pipe (expected when piping to head, etc.)
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        Err(e) => Err(e),
    }
}
