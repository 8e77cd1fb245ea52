//! MkDocs navigation loading and flattening.
//!
//! The navigation tree in `mkdocs.yml` defines the order in which markdown
//! files are assembled. This crate loads it ([`load_mkdocs`]), flattens it
//! depth-first into [`NavEntry`] values ([`flatten`]), and groups it into
//! top-level [`Chapter`]s for per-chapter export ([`chapters`]).
//!
//! Files referenced by the nav but missing on disk are skipped with a warning.

mod parser;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info, instrument, warn};

use docexport_markdown::{chapter_slug, title_from_stem};
use docexport_shared::{Chapter, DocExportError, NavEntry, Result};

pub use parser::{NavNode, TagPolicy, parse_nav, parse_yaml};

/// Default `docs_dir` when mkdocs.yml does not set one.
const DEFAULT_DOCS_DIR: &str = "docs";

/// Chapter name used for top-level pages outside any section.
const HOME_CHAPTER: &str = "Home";

// ---------------------------------------------------------------------------
// MkDocsConfig
// ---------------------------------------------------------------------------

/// The parts of `mkdocs.yml` the exporter needs.
#[derive(Debug, Clone)]
pub struct MkDocsConfig {
    /// `site_name`, if set.
    pub site_name: Option<String>,
    /// Absolute (or root-relative) markdown source directory.
    pub docs_dir: PathBuf,
    /// Navigation tree, in declaration order.
    pub nav: Vec<NavNode>,
}

impl MkDocsConfig {
    /// Parse mkdocs YAML text. Relative `docs_dir` values resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path, policy: TagPolicy) -> Result<Self> {
        let value = parse_yaml(text, policy)?;

        let site_name = value
            .get("site_name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let docs_dir = value
            .get("docs_dir")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DOCS_DIR);

        let nav = value.get("nav").map(parse_nav).unwrap_or_default();

        Ok(Self {
            site_name,
            docs_dir: base_dir.join(docs_dir),
            nav,
        })
    }

    /// Total number of page references in the nav (existing or not).
    pub fn leaf_count(&self) -> usize {
        self.nav.iter().map(NavNode::leaf_count).sum()
    }
}

/// Load `mkdocs.yml` from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_mkdocs(path: &Path, policy: TagPolicy) -> Result<MkDocsConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| DocExportError::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let config = MkDocsConfig::parse(&text, base_dir, policy)?;
    info!(
        site_name = config.site_name.as_deref().unwrap_or(""),
        nav_items = config.nav.len(),
        pages = config.leaf_count(),
        "loaded MkDocs configuration"
    );
    Ok(config)
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Walk the nav depth-first and return every page whose file exists.
pub fn flatten(nav: &[NavNode], docs_dir: &Path) -> Vec<NavEntry> {
    let mut entries = Vec::new();
    let mut trail = Vec::new();
    walk(nav, docs_dir, &mut trail, &mut entries);
    debug!(count = entries.len(), "flattened navigation");
    entries
}

fn walk(nodes: &[NavNode], docs_dir: &Path, trail: &mut Vec<String>, out: &mut Vec<NavEntry>) {
    for node in nodes {
        match node {
            NavNode::Page { title, path } => {
                if let Some(entry) = resolve_page(title.as_deref(), path, docs_dir, trail) {
                    out.push(entry);
                }
            }
            NavNode::Section { title, children } => {
                trail.push(title.clone());
                walk(children, docs_dir, trail, out);
                trail.pop();
            }
        }
    }
}

fn resolve_page(
    title: Option<&str>,
    path: &str,
    docs_dir: &Path,
    trail: &[String],
) -> Option<NavEntry> {
    if is_external(path) {
        debug!(path, "skipping external nav link");
        return None;
    }

    let file = docs_dir.join(path);
    if !file.is_file() {
        warn!(path = %file.display(), "file referenced in nav not found, skipping");
        return None;
    }

    Some(NavEntry {
        title: title
            .map(str::to_string)
            .unwrap_or_else(|| title_from_stem(path)),
        path: file,
        trail: trail.to_vec(),
    })
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("mailto:")
}

// ---------------------------------------------------------------------------
// Chapters
// ---------------------------------------------------------------------------

/// Group the nav into chapters: one per top-level section, plus a `Home`
/// chapter collecting top-level pages. Chapters without existing files are
/// dropped; duplicate slugs get numeric suffixes.
pub fn chapters(nav: &[NavNode], docs_dir: &Path) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    let mut home: Vec<NavEntry> = Vec::new();
    let mut home_position: Option<usize> = None;

    for node in nav {
        match node {
            NavNode::Page { .. } => {
                home_position.get_or_insert(chapters.len());
                home.extend(flatten(std::slice::from_ref(node), docs_dir));
            }
            NavNode::Section { title, children } => {
                let entries = flatten(children, docs_dir);
                if entries.is_empty() {
                    warn!(chapter = %title, "chapter has no existing files, skipping");
                    continue;
                }
                chapters.push(Chapter {
                    name: title.clone(),
                    slug: chapter_slug(title),
                    entries,
                });
            }
        }
    }

    if let Some(position) = home_position.filter(|_| !home.is_empty()) {
        chapters.insert(
            position,
            Chapter {
                name: HOME_CHAPTER.to_string(),
                slug: HOME_CHAPTER.to_string(),
                entries: home,
            },
        );
    }

    dedupe_slugs(&mut chapters);

    for chapter in &chapters {
        info!(chapter = %chapter.name, files = chapter.entries.len(), "found chapter");
    }

    chapters
}

/// Make every slug unique (case-insensitively, since slugs become file
/// names): a taken slug gets the first free `-2`, `-3`… suffix.
fn dedupe_slugs(chapters: &mut [Chapter]) {
    let mut taken: HashSet<String> = HashSet::new();
    for chapter in chapters.iter_mut() {
        if chapter.slug.is_empty() {
            chapter.slug = "Chapter".to_string();
        }
        let base = chapter.slug.clone();
        let mut n = 2;
        while !taken.insert(chapter.slug.to_lowercase()) {
            chapter.slug = format!("{base}-{n}");
            n += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
