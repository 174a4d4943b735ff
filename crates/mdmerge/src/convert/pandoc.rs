//! Conversion through the pandoc executable.

use crate::convert::interrupt::{is_interrupted, InterruptGuard};
use crate::convert::transient::create_input;
use crate::convert::{ConversionRequest, Converter};
use crate::errors::MergeError;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs pandoc as a subprocess.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: String,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl PandocConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument list for a request, excluding the input file.
    ///
    /// The writer is only named for non-PDF targets; for PDF pandoc derives
    /// it from `--pdf-engine` (LaTeX for xelatex, HTML for wkhtmltopdf).
    pub fn build_args(&self, request: &ConversionRequest<'_>) -> Vec<String> {
        let mut args = vec!["--from".to_string(), "markdown".to_string()];
        if request.format != "pdf" {
            args.push("--to".to_string());
            args.push(request.format.to_string());
        }
        args.push("--output".to_string());
        args.push(request.output.to_string_lossy().into_owned());
        args.extend(request.directives.iter().cloned());
        args
    }

    fn run_with_file(&self, request: &ConversionRequest<'_>) -> Result<Output, MergeError> {
        // Removed when `input` drops, on every return path.
        let input = create_input(request.text)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(request)).arg(input.path());
        debug!("Running {:?}", cmd);

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        let stderr = drain_stderr(&mut child);
        self.wait_interruptible(&mut child, stderr)
    }

    fn run_with_stdin(&self, request: &ConversionRequest<'_>) -> Result<Output, MergeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(request));
        debug!("Running {:?}", cmd);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        let stderr = drain_stderr(&mut child);

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(request.text.as_bytes()) {
                Ok(()) => {}
                // The converter quit early; its status and stderr tell why.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("{} closed its input early", self.program);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(MergeError::Conversion {
                        message: format!("Failed to send text to {}: {}", self.program, e),
                    });
                }
            }
        }

        self.wait_interruptible(&mut child, stderr)
    }

    /// Poll the child until it exits, killing it if a signal arrives.
    fn wait_interruptible(
        &self,
        child: &mut Child,
        stderr: JoinHandle<Vec<u8>>,
    ) -> Result<Output, MergeError> {
        let status = loop {
            if is_interrupted() {
                warn!("Interrupted, stopping {}", self.program);
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.interrupted());
            }
            let polled = child.try_wait().map_err(|e| MergeError::Conversion {
                message: format!("Failed to wait for {}: {}", self.program, e),
            })?;
            match polled {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        // A terminal Ctrl-C reaches the converter too and may kill it first.
        if !status.success() && is_interrupted() {
            return Err(self.interrupted());
        }

        Ok(Output {
            status,
            stdout: Vec::new(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }

    fn interrupted(&self) -> MergeError {
        MergeError::Interrupted {
            program: self.program.clone(),
        }
    }

    fn spawn_error(&self, e: io::Error) -> MergeError {
        MergeError::Conversion {
            message: format!("Failed to start {}: {}", self.program, e),
        }
    }
}

impl Converter for PandocConverter {
    fn convert(&self, request: &ConversionRequest<'_>) -> Result<(), MergeError> {
        let preexisting = request.output.exists();
        let _guard = InterruptGuard::install();

        let result = if request.use_input_file {
            self.run_with_file(request)
        } else {
            self.run_with_stdin(request)
        };

        let error = match result {
            Ok(output) if output.status.success() => return Ok(()),
            Ok(output) => MergeError::Conversion {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            },
            Err(e) => e,
        };

        if !preexisting {
            discard_partial_output(request.output);
        }
        Err(error)
    }
}

/// Read the child's stderr on a separate thread so a chatty converter
/// cannot block on a full pipe.
fn drain_stderr(child: &mut Child) -> JoinHandle<Vec<u8>> {
    let stderr = child.stderr.take();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf);
        }
        buf
    })
}

fn discard_partial_output(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) => warn!(
            "Failed to remove partial output {}: {}",
            path.display(),
            e
        ),
    }
}

/// Default artifact path for a root: `<root>/<variant file name>`.
pub fn default_output_path(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name)
}
