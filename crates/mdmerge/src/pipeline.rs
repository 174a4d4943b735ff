//! One merge pass from root directory to output artifact.
//!
//! Locate, aggregate, then hand off to the converter. The caller supplies the
//! root, the configuration and the collaborators; nothing is global.

use crate::config::MergeConfig;
use crate::convert::{
    build_directives, default_output_path, select_pdf_engine, ConversionRequest, Converter,
    EngineProbe, PdfEngine,
};
use crate::document::{AggregatedDocument, Aggregator, DocumentSet, MissingReference};
use crate::errors::MergeError;
use crate::variant::OutputVariant;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub documents: usize,
    pub engine: Option<PdfEngine>,
    /// Broken references that were rewritten anyway
    pub missing: Vec<MissingReference>,
}

/// A merge root together with its effective configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    root: PathBuf,
    config: MergeConfig,
}

impl Pipeline {
    /// Create a pipeline for `root`. A relative root is anchored at the
    /// current working directory so rewritten paths come out absolute.
    pub fn new(root: &Path, config: MergeConfig) -> Result<Self, MergeError> {
        let root = std::path::absolute(root).map_err(|e| MergeError::io(root, e))?;
        Ok(Self { root, config })
    }

    /// Create a pipeline, loading config from `config_path` or, failing
    /// that, from `<root>/mdmerge.toml` when present.
    pub fn open(root: &Path, config_path: Option<&Path>) -> Result<Self, MergeError> {
        let config = match config_path {
            Some(path) => MergeConfig::load_file(path)?,
            None => MergeConfig::load(root)?,
        };
        Self::new(root, config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn locate(&self) -> Result<DocumentSet, MergeError> {
        info!("Scanning directory: {}", self.root.display());
        let set = DocumentSet::locate(&self.root)?;
        info!("Found {} Markdown files", set.len());
        Ok(set)
    }

    /// Locate and merge without converting.
    pub fn merge(&self, variant: OutputVariant) -> Result<AggregatedDocument, MergeError> {
        let set = self.locate()?;
        self.aggregate(&set, variant)
    }

    /// Every local reference under the root that does not resolve.
    pub fn check(&self) -> Result<Vec<MissingReference>, MergeError> {
        let merged = self.merge(OutputVariant::Typesetting)?;
        Ok(merged.missing)
    }

    /// Full pass: locate, pick an engine when needed, merge, convert.
    ///
    /// The engine is selected before any document is read, so a missing
    /// engine aborts without touching the converter.
    pub fn convert(
        &self,
        variant: OutputVariant,
        output: Option<&Path>,
        probe: &dyn EngineProbe,
        converter: &dyn Converter,
        preferred_engine: Option<PdfEngine>,
    ) -> Result<ConversionReport, MergeError> {
        let set = self.locate()?;

        let engine = match variant {
            OutputVariant::Typesetting => Some(select_pdf_engine(probe, preferred_engine)?),
            OutputVariant::WordProcessor => None,
        };

        let merged = self.aggregate(&set, variant)?;

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(&self.root, variant.default_file_name()),
        };
        let bounds = self.config.media_bounds();
        let directives = build_directives(variant, engine, &self.root, &self.config, &bounds);

        info!("Exporting {} file: {}", variant, output.display());
        converter.convert(&ConversionRequest {
            text: &merged.text,
            format: variant.format_token(),
            output: &output,
            directives: &directives,
            use_input_file: variant.requires_input_file(),
        })?;
        info!("Export complete: {}", output.display());

        Ok(ConversionReport {
            output,
            documents: merged.section_count(),
            engine,
            missing: merged.missing,
        })
    }

    fn aggregate(
        &self,
        set: &DocumentSet,
        variant: OutputVariant,
    ) -> Result<AggregatedDocument, MergeError> {
        let options = self.config.render_options(variant);
        Aggregator::new(&options).aggregate(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::StaticProbe;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    struct RecordedCall {
        text: String,
        format: String,
        directives: Vec<String>,
        use_input_file: bool,
    }

    /// Records requests instead of running anything.
    #[derive(Default)]
    struct RecordingConverter {
        calls: RefCell<Vec<RecordedCall>>,
        fail: bool,
    }

    impl Converter for RecordingConverter {
        fn convert(&self, request: &ConversionRequest<'_>) -> Result<(), MergeError> {
            self.calls.borrow_mut().push(RecordedCall {
                text: request.text.to_string(),
                format: request.format.to_string(),
                directives: request.directives.to_vec(),
                use_input_file: request.use_input_file,
            });
            if self.fail {
                return Err(MergeError::Conversion {
                    message: "engine crashed".to_string(),
                });
            }
            Ok(())
        }
    }

    fn sample_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();
        fs::create_dir_all(temp.path().join("img")).unwrap();
        fs::write(temp.path().join("img/p.png"), b"png").unwrap();
        fs::write(temp.path().join("a/x.md"), "![i](../img/p.png)\n").unwrap();
        fs::write(temp.path().join("b.md"), "plain\n").unwrap();
        temp
    }

    #[test]
    fn test_docx_pass_uses_stdin_and_default_output() {
        let temp = sample_root();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let converter = RecordingConverter::default();

        let report = pipeline
            .convert(
                OutputVariant::WordProcessor,
                None,
                &StaticProbe::default(),
                &converter,
                None,
            )
            .unwrap();

        assert_eq!(report.output, temp.path().join("knowledgebase.docx"));
        assert_eq!(report.documents, 2);
        assert_eq!(report.engine, None);
        assert!(report.missing.is_empty());

        let calls = converter.calls.borrow();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.format, "docx");
        assert!(!call.use_input_file);
        assert!(call.text.contains("# a/x.md"));
        assert!(call.text.contains("# b.md"));
        assert_eq!(call.directives[0], "--standalone");
    }

    #[test]
    fn test_pdf_pass_without_engine_never_calls_converter() {
        let temp = sample_root();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let converter = RecordingConverter::default();

        let err = pipeline
            .convert(
                OutputVariant::Typesetting,
                None,
                &StaticProbe::default(),
                &converter,
                None,
            )
            .unwrap_err();

        assert!(matches!(err, MergeError::EngineUnavailable { .. }));
        assert!(converter.calls.borrow().is_empty());
    }

    #[test]
    fn test_pdf_pass_with_engine() {
        let temp = sample_root();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let converter = RecordingConverter::default();
        let out = temp.path().join("out.pdf");

        let report = pipeline
            .convert(
                OutputVariant::Typesetting,
                Some(&out),
                &StaticProbe::new(["wkhtmltopdf"]),
                &converter,
                None,
            )
            .unwrap();

        assert_eq!(report.engine, Some(PdfEngine::Wkhtmltopdf));
        assert_eq!(report.output, out);
        let calls = converter.calls.borrow();
        let call = &calls[0];
        assert_eq!(call.format, "pdf");
        assert!(call.use_input_file);
        assert!(call.text.contains("keepaspectratio"));
        assert!(call.directives.contains(&"wkhtmltopdf".to_string()));
    }

    #[test]
    fn test_conversion_failure_is_terminal() {
        let temp = sample_root();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let converter = RecordingConverter {
            fail: true,
            ..Default::default()
        };

        let err = pipeline
            .convert(
                OutputVariant::WordProcessor,
                None,
                &StaticProbe::default(),
                &converter,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MergeError::Conversion { .. }));
    }

    #[test]
    fn test_empty_root_is_input_error_before_engine_check() {
        let temp = TempDir::new().unwrap();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let converter = RecordingConverter::default();

        let err = pipeline
            .convert(
                OutputVariant::Typesetting,
                None,
                &StaticProbe::default(),
                &converter,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, MergeError::NoDocuments { .. }));
        assert!(!temp.path().join("knowledgebase.pdf").exists());
    }

    #[test]
    fn test_check_reports_missing() {
        let temp = sample_root();
        fs::write(temp.path().join("c.md"), "![gone](nowhere.png)").unwrap();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();

        let missing = pipeline.check().unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].target, "nowhere.png");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let temp = sample_root();
        let pipeline = Pipeline::new(temp.path(), MergeConfig::default()).unwrap();
        let first = pipeline.merge(OutputVariant::Typesetting).unwrap();
        let second = pipeline.merge(OutputVariant::Typesetting).unwrap();
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_open_reads_root_config() {
        let temp = sample_root();
        fs::write(
            temp.path().join("mdmerge.toml"),
            "[media]\nmax_width = \"5cm\"\n",
        )
        .unwrap();
        let pipeline = Pipeline::open(temp.path(), None).unwrap();
        let merged = pipeline.merge(OutputVariant::Typesetting).unwrap();
        assert!(merged.text.contains("{width=5cm,"));
    }
}
