//! Application configuration for docexport.
//!
//! Project config lives at `<project root>/docexport.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocExportError, Result};

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "docexport.toml";

// ---------------------------------------------------------------------------
// Config structs (matching docexport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document metadata.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Input and output locations, relative to the project root.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Mermaid rendering settings.
    #[serde(default)]
    pub diagrams: DiagramConfig,

    /// Pandoc invocation settings.
    #[serde(default)]
    pub pandoc: PandocConfig,
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Document title. Empty means "use `site_name` from mkdocs.yml".
    #[serde(default)]
    pub title: String,

    /// Author written into the document metadata.
    #[serde(default = "default_author")]
    pub author: String,

    /// Prefix for output file names. Empty means "derive from the title".
    #[serde(default)]
    pub file_prefix: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: default_author(),
            file_prefix: String::new(),
        }
    }
}

fn default_author() -> String {
    "Documentation Team".into()
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// MkDocs configuration file.
    #[serde(default = "default_mkdocs")]
    pub mkdocs: PathBuf,

    /// Where generated documents are written.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Optional pandoc reference document (used only if it exists).
    #[serde(default = "default_reference_doc")]
    pub reference_doc: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mkdocs: default_mkdocs(),
            export_dir: default_export_dir(),
            reference_doc: default_reference_doc(),
        }
    }
}

fn default_mkdocs() -> PathBuf {
    PathBuf::from("mkdocs.yml")
}
fn default_export_dir() -> PathBuf {
    PathBuf::from("docs/export")
}
fn default_reference_doc() -> PathBuf {
    PathBuf::from("scripts/reference.docx")
}

/// `[diagrams]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Container image providing `mmdc`.
    #[serde(default = "default_docker_image")]
    pub docker_image: String,

    /// npm package providing `mmdc` for the npx backend.
    #[serde(default = "default_npm_package")]
    pub npm_package: String,

    /// Background colour passed to `mmdc -b`.
    #[serde(default = "default_background")]
    pub background: String,

    /// Scale factor passed to `mmdc --scale`.
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Per-diagram render timeout.
    #[serde(default = "default_diagram_timeout")]
    pub timeout_secs: u64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            docker_image: default_docker_image(),
            npm_package: default_npm_package(),
            background: default_background(),
            scale: default_scale(),
            timeout_secs: default_diagram_timeout(),
        }
    }
}

impl DiagramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_docker_image() -> String {
    "minlag/mermaid-cli".into()
}
fn default_npm_package() -> String {
    "@mermaid-js/mermaid-cli".into()
}
fn default_background() -> String {
    "white".into()
}
fn default_scale() -> u32 {
    2
}
fn default_diagram_timeout() -> u64 {
    60
}

/// `[pandoc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandocConfig {
    /// Pandoc executable name or path.
    #[serde(default = "default_pandoc")]
    pub program: String,

    /// Timeout for single-document conversions.
    #[serde(default = "default_pandoc_timeout")]
    pub timeout_secs: u64,

    /// Timeout for each chapter conversion.
    #[serde(default = "default_chapter_timeout")]
    pub chapter_timeout_secs: u64,

    /// Depth of the generated table of contents.
    #[serde(default = "default_toc_depth")]
    pub toc_depth: u8,
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            program: default_pandoc(),
            timeout_secs: default_pandoc_timeout(),
            chapter_timeout_secs: default_chapter_timeout(),
            toc_depth: default_toc_depth(),
        }
    }
}

impl PandocConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn chapter_timeout(&self) -> Duration {
        Duration::from_secs(self.chapter_timeout_secs)
    }
}

fn default_pandoc() -> String {
    "pandoc".into()
}
fn default_pandoc_timeout() -> u64 {
    300
}
fn default_chapter_timeout() -> u64 {
    120
}
fn default_toc_depth() -> u8 {
    3
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Resolve the document title, falling back to the MkDocs `site_name`.
    pub fn resolved_title(&self, site_name: Option<&str>) -> String {
        if !self.project.title.trim().is_empty() {
            return self.project.title.trim().to_string();
        }
        site_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Documentation")
            .to_string()
    }

    /// Resolve the output file prefix, deriving it from the title if unset.
    pub fn resolved_file_prefix(&self, title: &str) -> String {
        if !self.project.file_prefix.trim().is_empty() {
            return self.project.file_prefix.trim().to_string();
        }
        file_prefix_from_title(title)
    }
}

/// Turn a title into a file-name prefix: `"My Docs & More"` → `"My_Docs_More"`.
pub fn file_prefix_from_title(title: &str) -> String {
    static NON_WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    static SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").expect("valid regex"));

    let cleaned = NON_WORD_RE.replace_all(title, "");
    let joined = SEP_RE.replace_all(cleaned.trim(), "_");
    if joined.is_empty() {
        "Docs".to_string()
    } else {
        joined.into_owned()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file inside a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. An explicit path must exist; otherwise
/// `<root>/docexport.toml` is used when present, defaults when not.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let path = config_file_path(root);
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocExportError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocExportError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into the project root.
/// Refuses to overwrite an existing file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(DocExportError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocExportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocExportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
