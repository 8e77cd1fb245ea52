//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docexport_core::{
    ExportReport, ProgressReporter, Project, SilentProgress, export_chapters, export_filtered,
    export_inline, locate_project_root,
};
use docexport_nav::{TagPolicy, load_mkdocs};
use docexport_shared::{AppConfig, init_config, load_config};
use docexport_tools::pandoc::MERMAID_FILTER;
use docexport_tools::{SystemRunner, detect_backends, locate, require};
use docexport_workbook::{Dataset, staffing_dataset, workbook_file_name, write_workbook};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docexport: MkDocs documentation to Word, staffing tables to Excel.
#[derive(Parser)]
#[command(
    name = "docexport",
    version,
    about = "Export MkDocs documentation to DOCX via pandoc, and staffing data to XLSX.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Project root (directory containing mkdocs.yml, or its scripts/ dir).
    #[arg(long, global = true, env = "DOCEXPORT_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/docexport.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide the progress spinner.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Single-document export mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ModeArg {
    /// Render diagrams with the Mermaid CLI before conversion.
    Inline,
    /// Let pandoc's mermaid-filter render diagrams.
    Filter,
}

/// Navigation listing format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum NavFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Export the whole documentation as one DOCX file.
    Export {
        /// How diagrams are rendered.
        #[arg(long, value_enum, default_value = "inline")]
        mode: ModeArg,

        /// Output file (defaults to <export_dir>/<prefix>_Complete_Documentation[_Filtered].docx).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export one DOCX file per top-level navigation section.
    Chapters,

    /// Print the flattened navigation.
    Nav {
        #[arg(long, value_enum, default_value = "text")]
        format: NavFormat,
    },

    /// Write the staffing workbook (XLSX).
    Workload {
        /// Output file (defaults to <export_dir>/<prefix>_Weekly_Workload_Breakdown.xlsx).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file with [[sheets]] replacing the built-in data.
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Check external tools: pandoc, mermaid-filter, diagram backends.
    Doctor,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docexport=info",
        1 => "docexport=debug",
        _ => "docexport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let start = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let explicit_config = cli.config.as_deref();

    match cli.command {
        Command::Export { mode, ref output } => {
            let project = open_project(&start, explicit_config)?;
            cmd_export(&project, mode, output.as_deref(), cli.quiet).await
        }
        Command::Chapters => {
            let project = open_project(&start, explicit_config)?;
            cmd_chapters(&project, cli.quiet).await
        }
        Command::Nav { format } => {
            let project = open_project(&start, explicit_config)?;
            cmd_nav(&project, format)
        }
        Command::Workload { ref output, ref data } => {
            cmd_workload(&start, explicit_config, output.as_deref(), data.as_deref())
        }
        Command::Doctor => cmd_doctor().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&start),
            ConfigAction::Show => cmd_config_show(&start, explicit_config),
        },
    }
}

/// Root for commands that work without mkdocs.yml.
fn lenient_root(start: &Path) -> PathBuf {
    locate_project_root(start).unwrap_or_else(|_| start.to_path_buf())
}

fn open_project(start: &Path, explicit_config: Option<&Path>) -> Result<Project> {
    let root = locate_project_root(start)?;
    let config = load_config(&root, explicit_config)?;
    Ok(Project::open(&root, config)?)
}

fn reporter(quiet: bool) -> Box<dyn ProgressReporter> {
    if quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(CliProgress::new())
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_export(project: &Project, mode: ModeArg, output: Option<&Path>, quiet: bool) -> Result<()> {
    let pandoc = project.config.pandoc.program.as_str();
    match mode {
        ModeArg::Inline => require(&[pandoc])?,
        ModeArg::Filter => require(&[pandoc, MERMAID_FILTER])?,
    };

    info!(?mode, title = %project.title, "exporting documentation");

    let progress = reporter(quiet);
    let report = match mode {
        ModeArg::Inline => export_inline(project, &SystemRunner, output, progress.as_ref()).await?,
        ModeArg::Filter => export_filtered(project, &SystemRunner, output, progress.as_ref()).await?,
    };

    print_report("Export complete!", &report);
    Ok(())
}

async fn cmd_chapters(project: &Project, quiet: bool) -> Result<()> {
    require(&[project.config.pandoc.program.as_str(), MERMAID_FILTER])?;

    let progress = reporter(quiet);
    let report = export_chapters(project, &SystemRunner, progress.as_ref()).await?;

    print_report("Chapter export finished", &report);

    if !report.failed.is_empty() {
        let names: Vec<_> = report.failed.iter().map(|f| f.name.as_str()).collect();
        return Err(eyre!(
            "failed to convert {} chapter(s): {}",
            report.failed.len(),
            names.join(", ")
        ));
    }
    Ok(())
}

fn cmd_nav(project: &Project, format: NavFormat) -> Result<()> {
    let entries = project.entries()?;

    match format {
        NavFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        NavFormat::Text => {
            for (i, entry) in entries.iter().enumerate() {
                let relative = entry
                    .path
                    .strip_prefix(&project.mkdocs.docs_dir)
                    .unwrap_or(&entry.path);
                println!("{:>3}. {}  ({})", i + 1, entry.qualified_title(), relative.display());
            }
            println!();
            println!("  {} files, {} navigation entries", entries.len(), project.mkdocs.leaf_count());
        }
    }
    Ok(())
}

fn cmd_workload(
    start: &Path,
    explicit_config: Option<&Path>,
    output: Option<&Path>,
    data: Option<&Path>,
) -> Result<()> {
    let root = lenient_root(start);
    let config = load_config(&root, explicit_config)?;

    let dataset = match data {
        Some(path) => Dataset::from_toml_file(path)?,
        None => staffing_dataset(),
    };

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let site_name = load_mkdocs(&root.join(&config.paths.mkdocs), TagPolicy::Placeholder)
                .ok()
                .and_then(|m| m.site_name);
            let title = config.resolved_title(site_name.as_deref());
            let prefix = config.resolved_file_prefix(&title);
            root.join(&config.paths.export_dir)
                .join(workbook_file_name(&prefix))
        }
    };

    write_workbook(&dataset, &output)?;

    println!();
    println!("  Workbook created: {}", output.display());
    println!("  Sheets:");
    for name in dataset.sheet_names() {
        println!("    - {name}");
    }
    println!();
    Ok(())
}

async fn cmd_doctor() -> Result<()> {
    println!();
    println!("  Tools on PATH:");
    let mut pandoc_found = false;
    for program in ["pandoc", MERMAID_FILTER, "docker", "npx", "mmdc"] {
        let status = locate(program);
        match &status.path {
            Some(path) => println!("    ✓ {program:<15} {}", path.display()),
            None => println!("    ✗ {program:<15} not found"),
        }
        if program == "pandoc" {
            pandoc_found = status.found();
        }
    }

    let backends = detect_backends(&SystemRunner).await;
    println!();
    if backends.is_empty() {
        println!("  Diagram backends: none (diagrams will be exported as code)");
    } else {
        let names: Vec<_> = backends.iter().map(|b| b.name()).collect();
        println!("  Diagram backends: {}", names.join(", "));
    }
    println!();

    if !pandoc_found {
        return Err(eyre!("pandoc is required for DOCX export"));
    }
    Ok(())
}

fn cmd_config_init(start: &Path) -> Result<()> {
    let path = init_config(&lenient_root(start))?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(start: &Path, explicit_config: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(&lenient_root(start), explicit_config)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_report(heading: &str, report: &ExportReport) {
    println!();
    println!("  {heading}");
    for output in &report.outputs {
        println!("  Output: {} ({} bytes)", output.path.display(), output.bytes);
    }
    for failed in &report.failed {
        println!("  Failed: {}", failed.name);
    }
    println!("  Files:  {}", report.entries);
    if report.diagrams.found > 0 {
        println!(
            "  Diagrams: {}/{} rendered",
            report.diagrams.rendered, report.diagrams.found
        );
    }
    println!("  Time:   {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn entry(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {title}"));
    }

    fn done(&self, _report: &ExportReport) {
        self.spinner.finish_and_clear();
    }
}
