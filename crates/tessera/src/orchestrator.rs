//! Build orchestration
//!
//! A run validates the inputs of every selected pipeline up front, then builds
//! the pipelines in a fixed order: CSS, JS, HTML. A missing input anywhere
//! aborts the run before a single file is read or written.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::ValueEnum;
use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};

use crate::{
    backup,
    bundle::{self, MissingInputError, SourceFile, TransformResult},
    config::{Config, FileMapping},
    css, html, js,
    stats::{self, FileStats, Totals},
    util::{display_name, write_output},
};

/// What to build, as selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Target {
    /// Every pipeline
    All,
    /// The merged stylesheet
    Css,
    /// Per-file scripts
    Js,
    /// Per-file pages
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    Css,
    Js,
    Html,
}

impl Pipeline {
    /// Build order
    pub const ALL: [Self; 3] = [Self::Css, Self::Js, Self::Html];

    fn selected_by(self, target: Target) -> bool {
        match target {
            Target::All => true,
            Target::Css => self == Self::Css,
            Target::Js => self == Self::Js,
            Target::Html => self == Self::Html,
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css => write!(f, "CSS"),
            Self::Js => write!(f, "JS"),
            Self::Html => write!(f, "HTML"),
        }
    }
}

/// Pipelines selected by `targets`, in build order. No targets means all.
pub fn select_pipelines(targets: &[Target]) -> IndexSet<Pipeline> {
    Pipeline::ALL
        .into_iter()
        .filter(|pipeline| {
            targets.is_empty()
                || targets
                    .iter()
                    .any(|target| pipeline.selected_by(*target))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Strip comments and whitespace; when unset files pass through unchanged
    pub minify: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { minify: true }
    }
}

/// Outcome of one pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub files: Vec<FileStats>,
    pub totals: Totals,
    pub outputs: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
    /// Scripts that ended inside a block comment
    pub unterminated: Vec<String>,
}

impl PipelineReport {
    fn record(&mut self, stats: FileStats) {
        self.totals.add(&stats);
        self.files.push(stats);
    }
}

/// Per-pipeline reports in build order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pipelines: IndexMap<Pipeline, PipelineReport>,
}

impl BuildReport {
    pub fn get(&self, pipeline: Pipeline) -> Option<&PipelineReport> {
        self.pipelines.get(&pipeline)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.pipelines
            .values()
            .flat_map(|report| report.outputs.iter().map(PathBuf::as_path))
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    config: Config,
    now: DateTime<Local>,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            now: Local::now(),
        }
    }

    /// Use a fixed clock for backup names.
    #[must_use]
    pub fn with_timestamp(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Build the selected targets.
    pub fn run(&self, targets: &[Target], options: &BuildOptions) -> Result<BuildReport> {
        let pipelines = select_pipelines(targets);
        self.check_inputs(&pipelines)?;

        if !options.minify {
            info!("Minification disabled, copying sources unchanged");
        }

        let mut report = BuildReport::default();
        for pipeline in pipelines {
            let pipeline_report = match pipeline {
                Pipeline::Css => self.build_css(options)?,
                Pipeline::Js => self.build_js(options)?,
                Pipeline::Html => self.build_html(options)?,
            };
            stats::log_totals(&pipeline.to_string(), &pipeline_report.totals);
            report.pipelines.insert(pipeline, pipeline_report);
        }
        Ok(report)
    }

    /// Declared inputs of a pipeline, in order
    pub fn inputs(&self, pipeline: Pipeline) -> Vec<PathBuf> {
        match pipeline {
            Pipeline::Css => self.config.css_inputs(),
            Pipeline::Js => sources(&self.config.js_files()),
            Pipeline::Html => sources(&self.config.html_files()),
        }
    }

    /// Validate every selected pipeline, reporting all missing paths together.
    pub fn check_inputs(&self, pipelines: &IndexSet<Pipeline>) -> Result<(), MissingInputError> {
        let errors = pipelines
            .iter()
            .filter_map(|pipeline| bundle::check_inputs(&self.inputs(*pipeline)).err());
        match MissingInputError::merge(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn build_css(&self, options: &BuildOptions) -> Result<PipelineReport> {
        let inputs = self.config.css_inputs();
        info!("Bundling {} stylesheet(s)", inputs.len());

        let minify_options = self.config.css.minify_options();
        let bundle = bundle::assemble(
            &inputs,
            |text| css::minify_with(text, &minify_options),
            options.minify,
        )?;

        let mut report = PipelineReport::default();
        for result in &bundle.results {
            let file_stats = FileStats::from(result);
            stats::log_file(&file_stats);
            report.record(file_stats);
        }

        let output = self.config.css_output();
        let rendered = bundle.render();
        self.backup(&output, &display_name(&output), &self.config.css.backup_dir, &mut report)?;
        write_output(&output, &rendered)?;
        info!(
            "Wrote {} ({} from {})",
            output.display(),
            stats::format_kb(rendered.len()),
            stats::format_kb(bundle.original_len())
        );
        report.outputs.push(output);

        Ok(report)
    }

    fn build_js(&self, options: &BuildOptions) -> Result<PipelineReport> {
        let files = self.config.js_files();
        let mode = self.config.js.strip_mode;
        info!("Processing {} script(s), {mode} comment stripping", files.len());

        let mut unterminated = Vec::new();
        let mut report = self.build_per_file(&files, &self.config.js.backup_dir, |file, source| {
            if !options.minify {
                return source.content.clone();
            }
            let stripped = js::strip_source(&source.content, mode);
            if !stripped.state.is_clean() {
                warn!("{}: unterminated block comment", file.name);
                unterminated.push(file.name.clone());
            }
            stripped.text
        })?;
        report.unterminated = unterminated;

        for file_stats in &report.files {
            stats::log_file_with_lines(file_stats);
        }
        Ok(report)
    }

    fn build_html(&self, options: &BuildOptions) -> Result<PipelineReport> {
        let files = self.config.html_files();
        info!("Processing {} page(s)", files.len());

        let html_options = self.config.html.options();
        let report = self.build_per_file(&files, &self.config.html.backup_dir, |_, source| {
            if options.minify {
                html::minify(&source.content, &html_options)
            } else {
                source.content.clone()
            }
        })?;

        for file_stats in &report.files {
            stats::log_file(file_stats);
        }
        Ok(report)
    }

    /// Transform each file and write it to its own output path.
    fn build_per_file<F>(
        &self,
        files: &[FileMapping],
        backup_dir: &Path,
        mut transform: F,
    ) -> Result<PipelineReport>
    where
        F: FnMut(&FileMapping, &SourceFile) -> String,
    {
        let loaded = bundle::load_sources(&sources(files))?;

        let mut report = PipelineReport::default();
        for (file, source) in files.iter().zip(&loaded) {
            let text = transform(file, source);
            let result = TransformResult {
                name: file.name.clone(),
                ..TransformResult::new(source, text)
            };

            self.backup(&file.output, &file.name, backup_dir, &mut report)?;
            write_output(&file.output, &result.text)?;
            debug!("Wrote {}", file.output.display());

            report.record(FileStats::from(&result));
            report.outputs.push(file.output.clone());
        }
        Ok(report)
    }

    fn backup(
        &self,
        output: &Path,
        name: &str,
        backup_dir: &Path,
        report: &mut PipelineReport,
    ) -> Result<()> {
        if !self.config.backup {
            return Ok(());
        }
        let dir = self.config.resolve(backup_dir);
        if let Some(path) = backup::backup_existing(output, name, &dir, &self.now)? {
            report.backups.push(path);
        }
        Ok(())
    }
}

fn sources(files: &[FileMapping]) -> Vec<PathBuf> {
    files.iter().map(|file| file.source.clone()).collect()
}
