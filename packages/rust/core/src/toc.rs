//! Title page and table of contents for the single-document export.

use std::fmt::Write;

use docexport_markdown::anchor_for;
use docexport_shared::NavEntry;

/// Title page: document title, export subtitle, provenance line, rule.
pub fn title_page(title: &str) -> String {
    format!(
        "# {title}\n\n## Complete Documentation Export\n\n*Generated from MkDocs documentation*\n\n---\n\n"
    )
}

/// `# Table of Contents` with one anchor link per entry, closed by a rule.
pub fn table_of_contents(entries: &[NavEntry]) -> String {
    let mut out = String::from("# Table of Contents\n\n");
    for entry in entries {
        let _ = writeln!(out, "- [{}](#{})", entry.title, anchor_for(&entry.title));
    }
    out.push_str("\n---\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(title: &str) -> NavEntry {
        NavEntry {
            title: title.into(),
            path: PathBuf::from("docs/x.md"),
            trail: vec![],
        }
    }

    #[test]
    fn title_page_layout() {
        assert_eq!(
            title_page("Platform"),
            "# Platform\n\n## Complete Documentation Export\n\n*Generated from MkDocs documentation*\n\n---\n\n"
        );
    }

    #[test]
    fn toc_links_use_anchors() {
        let toc = table_of_contents(&[entry("Getting Started"), entry("Backup & Restore")]);
        assert_eq!(
            toc,
            "# Table of Contents\n\n\
             - [Getting Started](#getting-started)\n\
             - [Backup & Restore](#backup-and-restore)\n\
             \n---\n\n"
        );
    }

    #[test]
    fn empty_toc_still_has_heading() {
        assert_eq!(table_of_contents(&[]), "# Table of Contents\n\n\n---\n\n");
    }
}
