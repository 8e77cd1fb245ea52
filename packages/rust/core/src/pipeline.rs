//! End-to-end export pipelines: mkdocs.yml → assemble → pandoc → .docx.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use docexport_markdown::{DiagramStats, chapter_title};
use docexport_nav::{MkDocsConfig, TagPolicy, chapters, flatten, load_mkdocs};
use docexport_shared::{AppConfig, Chapter, DocExportError, NavEntry, Result};
use docexport_tools::{CommandRunner, DocumentMeta, MermaidCli, PandocJob, convert_markdown};

use crate::assembler::{assemble_chapter, assemble_filtered, assemble_inline};

/// MkDocs configuration file name.
pub const MKDOCS_FILE: &str = "mkdocs.yml";

/// Directory under the export dir that receives rendered diagrams and
/// failing diagram sources.
const DIAGRAMS_DIR: &str = "diagrams";

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// Find the project root from `start`: `start` itself when it holds
/// `mkdocs.yml`, or its parent when `start` is a `scripts` directory.
pub fn locate_project_root(start: &Path) -> Result<PathBuf> {
    if start.join(MKDOCS_FILE).is_file() {
        return Ok(start.to_path_buf());
    }

    if start.file_name().is_some_and(|name| name == "scripts") {
        if let Some(parent) = start.parent().filter(|p| p.join(MKDOCS_FILE).is_file()) {
            return Ok(parent.to_path_buf());
        }
    }

    Err(DocExportError::config(format!(
        "{MKDOCS_FILE} not found in {}. Run from the project root or its scripts directory",
        start.display()
    )))
}

/// Single-document export flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Diagrams rendered by this tool.
    Inline,
    /// Diagrams rendered by pandoc's `mermaid-filter`.
    Filter,
}

/// A loaded documentation project.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: AppConfig,
    pub mkdocs: MkDocsConfig,
    /// Document title (config, else `site_name`).
    pub title: String,
    /// Output file-name prefix.
    pub file_prefix: String,
    /// Metadata date, `YYYY-MM-DD`.
    pub date: String,
}

impl Project {
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn open(root: &Path, config: AppConfig) -> Result<Self> {
        let mkdocs = load_mkdocs(&root.join(&config.paths.mkdocs), TagPolicy::Placeholder)?;
        let title = config.resolved_title(mkdocs.site_name.as_deref());
        let file_prefix = config.resolved_file_prefix(&title);
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();

        info!(%title, %file_prefix, docs_dir = %mkdocs.docs_dir.display(), "opened project");

        Ok(Self {
            root: root.to_path_buf(),
            config,
            mkdocs,
            title,
            file_prefix,
            date,
        })
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn export_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.export_dir)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.export_dir().join(DIAGRAMS_DIR)
    }

    pub fn reference_doc(&self) -> PathBuf {
        self.root.join(&self.config.paths.reference_doc)
    }

    /// Flattened navigation; an empty result is an error.
    pub fn entries(&self) -> Result<Vec<NavEntry>> {
        if self.mkdocs.nav.is_empty() {
            return Err(DocExportError::validation(format!(
                "no navigation found in {}",
                self.config.paths.mkdocs.display()
            )));
        }
        let entries = flatten(&self.mkdocs.nav, &self.mkdocs.docs_dir);
        if entries.is_empty() {
            return Err(DocExportError::validation(
                "none of the files referenced in the navigation exist",
            ));
        }
        info!(count = entries.len(), "found files to process");
        Ok(entries)
    }

    /// Top-level chapters; an empty result is an error.
    pub fn chapters(&self) -> Result<Vec<Chapter>> {
        let chapters = chapters(&self.mkdocs.nav, &self.mkdocs.docs_dir);
        if chapters.is_empty() {
            return Err(DocExportError::validation("no chapters found in the navigation"));
        }
        Ok(chapters)
    }

    pub fn output_path(&self, mode: ExportMode) -> PathBuf {
        let suffix = match mode {
            ExportMode::Inline => "",
            ExportMode::Filter => "_Filtered",
        };
        self.export_dir()
            .join(format!("{}_Complete_Documentation{suffix}.docx", self.file_prefix))
    }

    pub fn chapter_output_path(&self, chapter: &Chapter) -> PathBuf {
        self.export_dir()
            .join(format!("{}_{}_Documentation.docx", self.file_prefix, chapter.slug))
    }

    fn meta(&self, title: String) -> DocumentMeta {
        DocumentMeta {
            title,
            author: self.config.project.author.clone(),
            date: self.date.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// A written output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub bytes: u64,
}

impl OutputFile {
    fn stat(path: PathBuf) -> Result<Self> {
        let bytes = std::fs::metadata(&path)
            .map_err(|e| DocExportError::io(&path, e))?
            .len();
        Ok(Self { path, bytes })
    }
}

/// A unit of work (chapter) that failed while others continued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUnit {
    pub name: String,
    pub error: String,
}

/// Result of an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub outputs: Vec<OutputFile>,
    pub failed: Vec<FailedUnit>,
    /// Navigation entries processed.
    pub entries: usize,
    pub diagrams: DiagramStats,
    pub elapsed: Duration,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.outputs.is_empty()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each page is added to a document.
    fn entry(&self, title: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ExportReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn entry(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &ExportReport) {}
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DocExportError::io(dir, e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => create_dir(parent),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Single document with diagrams rendered to PNG by the Mermaid CLI.
#[instrument(skip_all, fields(root = %project.root.display()))]
pub async fn export_inline<R: CommandRunner>(
    project: &Project,
    runner: &R,
    output: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<ExportReport> {
    let start = Instant::now();

    progress.phase("Reading navigation");
    let entries = project.entries()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project.output_path(ExportMode::Inline));
    let images_dir = project.images_dir();
    ensure_parent(&output)?;
    create_dir(&images_dir)?;

    progress.phase("Detecting diagram renderers");
    let renderer = MermaidCli::detect(runner, project.config.diagrams.clone()).await;

    progress.phase("Assembling document");
    info!(images_dir = %images_dir.display(), "diagram images directory");
    let doc = assemble_inline(&project.title, &entries, &images_dir, &renderer, progress).await?;

    progress.phase("Converting to DOCX");
    let job = PandocJob::inline(
        &project.config.pandoc,
        output.clone(),
        project.meta(format!("{} Documentation", project.title)),
    )
    .with_reference_doc(&project.reference_doc());
    convert_markdown(runner, &doc.markdown, &job).await?;

    let report = ExportReport {
        outputs: vec![OutputFile::stat(output)?],
        failed: Vec::new(),
        entries: entries.len(),
        diagrams: doc.diagrams,
        elapsed: start.elapsed(),
    };
    finish(&report, progress);
    Ok(report)
}

/// Single document with diagrams left to pandoc's `mermaid-filter`.
#[instrument(skip_all, fields(root = %project.root.display()))]
pub async fn export_filtered<R: CommandRunner>(
    project: &Project,
    runner: &R,
    output: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<ExportReport> {
    let start = Instant::now();

    progress.phase("Reading navigation");
    let entries = project.entries()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project.output_path(ExportMode::Filter));
    ensure_parent(&output)?;

    progress.phase("Combining markdown files");
    let doc = assemble_filtered(&entries, &project.mkdocs.docs_dir, progress)?;

    progress.phase("Converting to DOCX");
    let job = PandocJob::filtered(
        &project.config.pandoc,
        output.clone(),
        project.meta(format!("{} Complete Documentation", project.title)),
    )
    .with_reference_doc(&project.reference_doc());
    convert_markdown(runner, &doc.markdown, &job).await?;

    let report = ExportReport {
        outputs: vec![OutputFile::stat(output)?],
        failed: Vec::new(),
        entries: entries.len(),
        diagrams: DiagramStats::default(),
        elapsed: start.elapsed(),
    };
    finish(&report, progress);
    Ok(report)
}

/// One document per top-level chapter. A failing chapter is recorded and
/// the remaining chapters are still exported.
#[instrument(skip_all, fields(root = %project.root.display()))]
pub async fn export_chapters<R: CommandRunner>(
    project: &Project,
    runner: &R,
    progress: &dyn ProgressReporter,
) -> Result<ExportReport> {
    let start = Instant::now();

    progress.phase("Reading navigation");
    let chapters = project.chapters()?;
    create_dir(&project.export_dir())?;

    let mut report = ExportReport::default();
    let total = chapters.len();

    for (i, chapter) in chapters.iter().enumerate() {
        progress.phase(&format!("Chapter {}/{total}: {}", i + 1, chapter.name));
        report.entries += chapter.entries.len();

        match export_chapter(project, runner, chapter, progress).await {
            Ok(file) => {
                info!(chapter = %chapter.name, path = %file.path.display(), bytes = file.bytes, "chapter exported");
                report.outputs.push(file);
            }
            Err(e) => {
                error!(chapter = %chapter.name, error = %e, "chapter export failed");
                report.failed.push(FailedUnit {
                    name: chapter.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report.elapsed = start.elapsed();
    finish(&report, progress);
    Ok(report)
}

async fn export_chapter<R: CommandRunner>(
    project: &Project,
    runner: &R,
    chapter: &Chapter,
    progress: &dyn ProgressReporter,
) -> Result<OutputFile> {
    let doc = assemble_chapter(chapter, &project.mkdocs.docs_dir, progress)?;
    let output = project.chapter_output_path(chapter);

    let job = PandocJob::chapter(
        &project.config.pandoc,
        output.clone(),
        project.meta(format!(
            "{} {} Documentation",
            project.title,
            chapter_title(&chapter.slug)
        )),
    )
    .with_reference_doc(&project.reference_doc());
    convert_markdown(runner, &doc.markdown, &job).await?;

    OutputFile::stat(output)
}

fn finish(report: &ExportReport, progress: &dyn ProgressReporter) {
    progress.done(report);
    info!(
        outputs = report.outputs.len(),
        failed = report.failed.len(),
        entries = report.entries,
        diagrams = report.diagrams.found,
        rendered = report.diagrams.rendered,
        elapsed_ms = report.elapsed.as_millis(),
        "export complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
