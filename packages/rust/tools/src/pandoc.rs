//! Pandoc invocation: argument construction per export mode and conversion
//! of an in-memory markdown document into a `.docx`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, instrument, warn};

use docexport_shared::{DocExportError, PandocConfig, Result};

use crate::runner::{CommandRunner, ToolCommand, run_checked};

/// Input format for inline mode, where fenced blocks must survive untouched.
pub const INLINE_FORMAT: &str =
    "markdown+fenced_code_blocks+fenced_code_attributes+backtick_code_blocks";

/// Pandoc filter that renders mermaid blocks during conversion.
pub const MERMAID_FILTER: &str = "mermaid-filter";

/// Document metadata written into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    pub author: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Everything pandoc needs besides the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocJob {
    pub program: String,
    pub output: PathBuf,
    pub from: String,
    pub filters: Vec<String>,
    pub toc_depth: u8,
    pub number_sections: bool,
    pub highlight_style: Option<String>,
    pub standalone: bool,
    pub reference_doc: Option<PathBuf>,
    pub meta: DocumentMeta,
    pub timeout: Duration,
}

impl PandocJob {
    fn base(config: &PandocConfig, output: PathBuf, meta: DocumentMeta) -> Self {
        Self {
            program: config.program.clone(),
            output,
            from: "markdown".to_string(),
            filters: Vec::new(),
            toc_depth: config.toc_depth,
            number_sections: false,
            highlight_style: None,
            standalone: false,
            reference_doc: None,
            meta,
            timeout: config.timeout(),
        }
    }

    /// Diagrams already rendered to images; numbered sections, highlighted code.
    pub fn inline(config: &PandocConfig, output: PathBuf, meta: DocumentMeta) -> Self {
        Self {
            from: INLINE_FORMAT.to_string(),
            number_sections: true,
            highlight_style: Some("pygments".to_string()),
            ..Self::base(config, output, meta)
        }
    }

    /// Diagrams rendered by `mermaid-filter` during conversion.
    pub fn filtered(config: &PandocConfig, output: PathBuf, meta: DocumentMeta) -> Self {
        Self {
            filters: vec![MERMAID_FILTER.to_string()],
            standalone: true,
            ..Self::base(config, output, meta)
        }
    }

    /// One chapter document; like [`PandocJob::filtered`] with a shorter timeout.
    pub fn chapter(config: &PandocConfig, output: PathBuf, meta: DocumentMeta) -> Self {
        Self {
            timeout: config.chapter_timeout(),
            ..Self::filtered(config, output, meta)
        }
    }

    /// Use `path` as the style reference, if it exists.
    pub fn with_reference_doc(mut self, path: &Path) -> Self {
        if path.is_file() {
            self.reference_doc = Some(path.to_path_buf());
        } else {
            info!(path = %path.display(), "no reference document, using pandoc defaults");
        }
        self
    }

    pub fn args(&self, input: &Path) -> Vec<String> {
        let mut args = vec![input.display().to_string()];
        for filter in &self.filters {
            args.push("--filter".to_string());
            args.push(filter.clone());
        }
        args.extend([
            "--from".to_string(),
            self.from.clone(),
            "--to".to_string(),
            "docx".to_string(),
            "--output".to_string(),
            self.output.display().to_string(),
            "--toc".to_string(),
            format!("--toc-depth={}", self.toc_depth),
        ]);
        if self.number_sections {
            args.push("--number-sections".to_string());
        }
        if let Some(style) = &self.highlight_style {
            args.push("--highlight-style".to_string());
            args.push(style.clone());
        }
        if self.standalone {
            args.push("--standalone".to_string());
        }
        if let Some(reference) = &self.reference_doc {
            args.push(format!("--reference-doc={}", reference.display()));
        }
        for (key, value) in [
            ("title", &self.meta.title),
            ("author", &self.meta.author),
            ("date", &self.meta.date),
        ] {
            args.push("--metadata".to_string());
            args.push(format!("{key}={value}"));
        }
        args
    }

    pub fn command(&self, input: &Path) -> ToolCommand {
        ToolCommand::new(self.program.as_str())
            .args(self.args(input))
            .timeout(self.timeout)
    }
}

/// Write `markdown` to a temporary file and convert it with `job`.
///
/// The temporary file is removed afterwards, whatever the outcome.
#[instrument(skip_all, fields(output = %job.output.display()))]
pub async fn convert_markdown<R: CommandRunner>(
    runner: &R,
    markdown: &str,
    job: &PandocJob,
) -> Result<()> {
    let mut input = tempfile::Builder::new()
        .prefix("docexport-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| DocExportError::io(std::env::temp_dir(), e))?;
    input
        .write_all(markdown.as_bytes())
        .map_err(|e| DocExportError::io(input.path(), e))?;

    convert(runner, input.path(), job).await
}

/// Run pandoc on an existing markdown file.
pub async fn convert<R: CommandRunner>(runner: &R, input: &Path, job: &PandocJob) -> Result<()> {
    let command = job.command(input);
    info!(command = %command.display(), "running pandoc");

    let output = run_checked(runner, &command).await?;
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        warn!(stderr, "pandoc reported warnings");
    }

    if !job.output.is_file() {
        return Err(DocExportError::ToolFailed {
            tool: job.program.clone(),
            status: output.status,
            stderr: format!("no output written to {}", job.output.display()),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRunner;
    use crate::runner::ToolOutput;

    fn meta() -> DocumentMeta {
        DocumentMeta {
            title: "Platform Docs".into(),
            author: "Documentation Team".into(),
            date: "2024-05-01".into(),
        }
    }

    #[test]
    fn inline_preset_args() {
        let job = PandocJob::inline(&PandocConfig::default(), "out.docx".into(), meta());
        assert_eq!(
            job.args(Path::new("in.md")),
            vec![
                "in.md",
                "--from",
                INLINE_FORMAT,
                "--to",
                "docx",
                "--output",
                "out.docx",
                "--toc",
                "--toc-depth=3",
                "--number-sections",
                "--highlight-style",
                "pygments",
                "--metadata",
                "title=Platform Docs",
                "--metadata",
                "author=Documentation Team",
                "--metadata",
                "date=2024-05-01",
            ]
        );
        assert_eq!(job.timeout, Duration::from_secs(300));
    }

    #[test]
    fn filter_preset_uses_mermaid_filter() {
        let job = PandocJob::filtered(&PandocConfig::default(), "out.docx".into(), meta());
        let args = job.args(Path::new("in.md"));
        assert_eq!(&args[..5], &["in.md", "--filter", "mermaid-filter", "--from", "markdown"]);
        assert!(args.contains(&"--standalone".to_string()));
        assert!(!args.contains(&"--number-sections".to_string()));
    }

    #[test]
    fn chapter_preset_has_shorter_timeout() {
        let job = PandocJob::chapter(&PandocConfig::default(), "c.docx".into(), meta());
        assert_eq!(job.timeout, Duration::from_secs(120));
        assert_eq!(job.filters, vec![MERMAID_FILTER]);
    }

    #[test]
    fn reference_doc_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.docx");
        let config = PandocConfig::default();

        let job = PandocJob::filtered(&config, "o.docx".into(), meta()).with_reference_doc(&reference);
        assert!(job.reference_doc.is_none());

        std::fs::write(&reference, b"docx").unwrap();
        let job = PandocJob::filtered(&config, "o.docx".into(), meta()).with_reference_doc(&reference);
        let expected = format!("--reference-doc={}", reference.display());
        assert!(job.args(Path::new("in.md")).contains(&expected));
    }

    #[tokio::test]
    async fn convert_markdown_feeds_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.docx");
        let runner = FakeRunner::new(|cmd| {
            let input = Path::new(&cmd.args[0]);
            assert_eq!(std::fs::read_to_string(input).unwrap(), "# Hello\n");
            let out_pos = cmd.args.iter().position(|a| a == "--output").unwrap();
            std::fs::write(&cmd.args[out_pos + 1], b"PK").unwrap();
            Ok(ToolOutput {
                status: Some(0),
                stderr: "[WARNING] Could not fetch resource".into(),
                ..Default::default()
            })
        });
        let job = PandocJob::inline(&PandocConfig::default(), output.clone(), meta());

        convert_markdown(&runner, "# Hello\n", &job).await.expect("convert");

        assert!(output.is_file());
        let input = PathBuf::from(&runner.commands()[0].args[0]);
        assert!(!input.exists(), "temporary input is removed");
    }

    #[tokio::test]
    async fn missing_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_| {
            Ok(ToolOutput {
                status: Some(0),
                ..Default::default()
            })
        });
        let job = PandocJob::inline(&PandocConfig::default(), dir.path().join("o.docx"), meta());
        let err = convert_markdown(&runner, "x", &job).await.unwrap_err();
        assert!(matches!(err, DocExportError::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn pandoc_errors_are_verbatim() {
        let runner = FakeRunner::new(|_| {
            Ok(ToolOutput {
                status: Some(83),
                stderr: "Error running filter mermaid-filter:\nCould not find executable".into(),
                ..Default::default()
            })
        });
        let job = PandocJob::filtered(&PandocConfig::default(), "o.docx".into(), meta());
        match convert_markdown(&runner, "x", &job).await {
            Err(DocExportError::ToolFailed { status, stderr, .. }) => {
                assert_eq!(status, Some(83));
                assert_eq!(stderr, "Error running filter mermaid-filter:\nCould not find executable");
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }
}
