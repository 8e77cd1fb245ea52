//! Markdown transforms used while assembling the intermediate document.
//!
//! - [`adjust_heading_levels`] nests a page's headings under a generated title
//! - [`replace_diagrams`] swaps mermaid blocks for rendered images
//! - title, anchor and slug helpers shared by the nav and assembly layers

mod diagrams;
mod headings;

use std::sync::LazyLock;

use regex::Regex;

pub use diagrams::{
    DiagramBlock, DiagramRenderer, DiagramStats, classify, clean_diagram_code,
    find_diagram_blocks, replace_diagrams, short_hash,
};
pub use headings::adjust_heading_levels;

/// Page break marker understood by pandoc's docx writer.
pub const PAGE_BREAK: &str = "\\newpage";

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Derive a display title from a file path or stem.
///
/// `guide/getting-started.md` → `Getting Started`; `index` → `Overview`.
pub fn title_from_stem(path: &str) -> String {
    let segment = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    let stem = segment.strip_suffix(".md").unwrap_or(segment);

    if stem == "index" {
        return "Overview".to_string();
    }

    title_case(&stem.replace(['-', '_'], " "))
}

/// Title-case `text`: a letter is upper-cased when it follows a non-letter
/// and lower-cased otherwise, so `k8s` becomes `K8S` and `o'neil` becomes
/// `O'Neil`. Whitespace is kept as is.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
        } else {
            out.push(c);
        }
        previous_is_letter = c.is_alphabetic();
    }

    out
}

/// In-document anchor for a section title, as used by the table of contents.
pub fn anchor_for(title: &str) -> String {
    title.to_lowercase().replace(' ', "-").replace('&', "and")
}

// ---------------------------------------------------------------------------
// Chapter slugs
// ---------------------------------------------------------------------------

/// Filename-safe slug for a chapter: punctuation dropped, runs of spaces and
/// dashes collapsed to a single `-`. Case is preserved.
pub fn chapter_slug(name: &str) -> String {
    static PUNCT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    static SEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

    let cleaned = PUNCT_RE.replace_all(name, "");
    SEP_RE.replace_all(cleaned.trim(), "-").into_owned()
}

/// Display title for a chapter slug: `getting-started` → `Getting Started`.
pub fn chapter_title(slug: &str) -> String {
    title_case(&slug.replace('-', " "))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_stem_converts_slugs() {
        assert_eq!(title_from_stem("getting-started"), "Getting Started");
        assert_eq!(title_from_stem("api_reference.md"), "Api Reference");
        assert_eq!(title_from_stem("guide/installation.md"), "Installation");
        assert_eq!(title_from_stem("index.md"), "Overview");
        assert_eq!(title_from_stem("RHEL-setup"), "Rhel Setup");
    }

    #[test]
    fn anchor_for_matches_toc_links() {
        assert_eq!(anchor_for("Getting Started"), "getting-started");
        assert_eq!(anchor_for("Backup & Restore"), "backup-and-restore");
    }

    #[test]
    fn chapter_slug_strips_punctuation() {
        assert_eq!(chapter_slug("Getting Started"), "Getting-Started");
        assert_eq!(chapter_slug("  Backup & Restore (DR) "), "Backup-Restore-DR");
        assert_eq!(chapter_slug("Day-2 -- Ops"), "Day-2-Ops");
        assert_eq!(chapter_slug("???"), "");
    }

    #[test]
    fn chapter_title_from_slug() {
        assert_eq!(chapter_title("Getting-Started"), "Getting Started");
        assert_eq!(chapter_title("api-REFERENCE"), "Api Reference");
    }

    #[test]
    fn title_case_starts_every_letter_run() {
        assert_eq!(title_from_stem("k8s-setup"), "K8S Setup");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("day-2 ops"), "Day-2 Ops");
        assert_eq!(title_case("  two  spaces "), "  Two  Spaces ");
        assert_eq!(title_case("ÉCOLE öffnen"), "École Öffnen");
    }
}
