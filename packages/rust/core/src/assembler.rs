//! Intermediate document assembly.
//!
//! Each export mode concatenates the flattened navigation differently:
//!
//! - inline: title page, table of contents, then every page under a `#`
//!   heading with its own headings shifted by one and diagrams rendered;
//! - filtered: every page under a `#` heading derived from its file name,
//!   page breaks in between, diagrams left for pandoc's filter;
//! - chapter: one `#` chapter heading, pages under `##` headings, headings
//!   shifted by two.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use docexport_markdown::{
    DiagramRenderer, DiagramStats, PAGE_BREAK, adjust_heading_levels, chapter_title,
    replace_diagrams, title_from_stem,
};
use docexport_shared::{Chapter, DocExportError, NavEntry, Result};

use crate::pipeline::ProgressReporter;
use crate::toc::{table_of_contents, title_page};

/// An assembled intermediate markdown document.
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument {
    pub markdown: String,
    /// Entries whose content made it into the document.
    pub included: usize,
    /// Entries that could not be read.
    pub skipped: usize,
    pub diagrams: DiagramStats,
}

impl AssembledDocument {
    fn ensure_not_blank(self, what: &str) -> Result<Self> {
        if self.included == 0 || self.markdown.trim().is_empty() {
            return Err(DocExportError::validation(format!(
                "{what}: assembled document is empty"
            )));
        }
        Ok(self)
    }
}

/// Section title for a page in the filtered and chapter layouts: the file
/// stem relative to `docs_dir`, title-cased.
pub fn stem_title(entry: &NavEntry, docs_dir: &Path) -> String {
    let relative = entry.path.strip_prefix(docs_dir).unwrap_or(&entry.path);
    title_from_stem(&relative.to_string_lossy())
}

fn read_entry(entry: &NavEntry) -> Result<String> {
    std::fs::read_to_string(&entry.path).map_err(|e| DocExportError::io(&entry.path, e))
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

/// Assemble the inline-mode document, rendering diagrams into `images_dir`.
///
/// An unreadable page is replaced by an error line; assembly continues.
#[instrument(skip_all, fields(entries = entries.len()))]
pub async fn assemble_inline<R: DiagramRenderer>(
    title: &str,
    entries: &[NavEntry],
    images_dir: &Path,
    renderer: &R,
    progress: &dyn ProgressReporter,
) -> Result<AssembledDocument> {
    let mut doc = AssembledDocument::default();
    doc.markdown.push_str(&title_page(title));
    doc.markdown.push_str(&table_of_contents(entries));

    let total = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        progress.entry(&entry.title, i + 1, total);

        let content = match read_entry(entry) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "could not read page");
                doc.markdown.push_str(&format!(
                    "*Error loading content from {}*\n\n",
                    entry.path.display()
                ));
                doc.skipped += 1;
                continue;
            }
        };

        debug!(title = %entry.title, path = %entry.path.display(), "adding page");
        doc.markdown
            .push_str(&format!("\n{PAGE_BREAK}\n\n# {}\n\n", entry.title));

        let (content, stats) = replace_diagrams(&content, images_dir, renderer).await;
        doc.diagrams += stats;

        doc.markdown.push_str(&adjust_heading_levels(&content, 1));
        doc.markdown.push_str("\n\n");
        doc.included += 1;
    }

    info!(
        included = doc.included,
        skipped = doc.skipped,
        diagrams = doc.diagrams.found,
        rendered = doc.diagrams.rendered,
        "assembled inline document"
    );
    doc.ensure_not_blank("inline export")
}

// ---------------------------------------------------------------------------
// Filtered / chapter
// ---------------------------------------------------------------------------

/// Assemble the filtered-mode document. Unreadable pages are skipped.
#[instrument(skip_all, fields(entries = entries.len()))]
pub fn assemble_filtered(
    entries: &[NavEntry],
    docs_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<AssembledDocument> {
    let mut parts: Vec<String> = Vec::new();
    let doc = append_pages(&mut parts, entries, docs_dir, "#", 1, progress);
    AssembledDocument {
        markdown: parts.join("\n"),
        ..doc
    }
    .ensure_not_blank("filtered export")
}

/// Assemble one chapter document. Unreadable pages are skipped.
#[instrument(skip_all, fields(chapter = %chapter.name, entries = chapter.entries.len()))]
pub fn assemble_chapter(
    chapter: &Chapter,
    docs_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<AssembledDocument> {
    let mut parts = vec![format!("# {}", chapter_title(&chapter.slug)), String::new()];
    let doc = append_pages(&mut parts, &chapter.entries, docs_dir, "##", 2, progress);
    AssembledDocument {
        markdown: parts.join("\n"),
        ..doc
    }
    .ensure_not_blank(&format!("chapter '{}'", chapter.name))
}

/// Push each readable page as: page break (after the first), heading, blank
/// line, shifted content, blank line.
fn append_pages(
    parts: &mut Vec<String>,
    entries: &[NavEntry],
    docs_dir: &Path,
    heading: &str,
    shift: i32,
    progress: &dyn ProgressReporter,
) -> AssembledDocument {
    let mut doc = AssembledDocument::default();
    let total = entries.len();

    for (i, entry) in entries.iter().enumerate() {
        let title = stem_title(entry, docs_dir);
        progress.entry(&title, i + 1, total);

        let content = match read_entry(entry) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "could not read page, skipping");
                doc.skipped += 1;
                continue;
            }
        };

        if doc.included > 0 {
            parts.push(format!("\n{PAGE_BREAK}\n"));
        }
        parts.push(format!("{heading} {title}"));
        parts.push(String::new());
        parts.push(adjust_heading_levels(&content, shift));
        parts.push(String::new());

        debug!(path = %entry.path.display(), "added page");
        doc.included += 1;
    }

    doc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
