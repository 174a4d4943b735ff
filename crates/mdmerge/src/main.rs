//! mdmerge
//!
//! Merges a folder of Markdown notes into one document and converts it with
//! pandoc. See `mdmerge --help` for commands and exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use mdmerge::cli::{Cli, Commands};
use mdmerge::convert::{
    cleanup_stale_inputs, EngineProbe, PandocConverter, PathProbe, PdfEngine, STALE_INPUT_AGE,
};
use mdmerge::document::relative_header;
use mdmerge::logging::{init_logging, Verbosity};
use mdmerge::output::{ExitCode, OutputContext};
use mdmerge::{MergeError, OutputVariant, Pipeline};
use tracing::{info, warn};

/// Helper to determine exit code from an error chain
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(merge_error) = error.downcast_ref::<MergeError>() {
        return merge_error.exit_code();
    }
    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::NotFound => ExitCode::NotFound,
            _ => ExitCode::ExternalError,
        };
    }
    ExitCode::GenericError
}

fn main() {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.verbose));
    let out = OutputContext::new(cli.quiet);

    let exit_code = match run(cli, &out) {
        Ok(code) => code,
        Err(e) => {
            let message = match e.downcast_ref::<MergeError>() {
                Some(merge_error) => merge_error.to_actionable().to_error_message(),
                None => format!("Error: {:#}", e),
            };
            let _ = out.print_error(message.trim_end());
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run(cli: Cli, out: &OutputContext) -> Result<ExitCode> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Docx { root, output } => {
            sweep_stale_inputs();
            let pipeline = Pipeline::open(&root, config)?;
            let converter = PandocConverter::new(pipeline.config().converter_program());
            let report = pipeline.convert(
                OutputVariant::WordProcessor,
                output.as_deref(),
                &PathProbe,
                &converter,
                None,
            )?;
            out.print_success(format!("Export complete: {}", report.output.display()))?;
        }
        Commands::Pdf {
            root,
            output,
            engine,
        } => {
            sweep_stale_inputs();
            let pipeline = Pipeline::open(&root, config)?;
            let converter = PandocConverter::new(pipeline.config().converter_program());
            let report = pipeline.convert(
                OutputVariant::Typesetting,
                output.as_deref(),
                &PathProbe,
                &converter,
                engine,
            )?;
            out.print_success(format!("Export complete: {}", report.output.display()))?;
        }
        Commands::Merge {
            root,
            output,
            variant,
        } => {
            let pipeline = Pipeline::open(&root, config)?;
            let merged = pipeline.merge(variant)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &merged.text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    out.print_success(format!(
                        "Merged {} documents into {}",
                        merged.section_count(),
                        path.display()
                    ))?;
                }
                None => out.print_raw(&merged.text)?,
            }
        }
        Commands::Check { root } => {
            let pipeline = Pipeline::open(&root, config)?;
            let missing = pipeline.check()?;
            if missing.is_empty() {
                out.print_success("All media references resolve")?;
                return Ok(ExitCode::Success);
            }
            for reference in &missing {
                out.print_data(format!(
                    "{}:{}: {} -> {}",
                    relative_header(pipeline.root(), &reference.document),
                    reference.line_number,
                    reference.target,
                    reference.resolved.display()
                ))?;
            }
            out.print_success(format!("{} broken media reference(s)", missing.len()))?;
            return Ok(ExitCode::ValidationFailed);
        }
        Commands::Engines => {
            let probe = PathProbe;
            let converter = config
                .map(mdmerge::MergeConfig::load_file)
                .transpose()?
                .unwrap_or_default()
                .converter_program();
            report_executable(out, &probe, &converter)?;
            for engine in PdfEngine::ALL {
                report_executable(out, &probe, engine.executable())?;
            }
        }
    }

    Ok(ExitCode::Success)
}

/// Remove converter inputs left behind by runs that were killed outright.
fn sweep_stale_inputs() {
    let dir = std::env::temp_dir();
    match cleanup_stale_inputs(&dir, STALE_INPUT_AGE) {
        Ok(0) => {}
        Ok(n) => info!("Removed {} stale input file(s) from {}", n, dir.display()),
        Err(e) => warn!("Skipping stale input cleanup: {}", e),
    }
}

fn report_executable(out: &OutputContext, probe: &dyn EngineProbe, name: &str) -> Result<()> {
    let status = if probe.is_available(name) {
        "found"
    } else {
        "missing"
    };
    out.print_data(format!("{:<12} {}", name, status))?;
    Ok(())
}
