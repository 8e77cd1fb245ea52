//! Core domain types shared between the nav, assembly and CLI layers.

use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// NavEntry
// ---------------------------------------------------------------------------

/// One flattened navigation leaf: a title plus an existing markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Display title (from the nav, or derived from the file stem).
    pub title: String,
    /// Path to the markdown file (`docs_dir` joined with the nav value).
    pub path: PathBuf,
    /// Titles of the enclosing nav sections, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trail: Vec<String>,
}

impl NavEntry {
    /// Section trail and title joined as `"Outer - Inner - Title"`.
    pub fn qualified_title(&self) -> String {
        if self.trail.is_empty() {
            return self.title.clone();
        }
        format!("{} - {}", self.trail.join(" - "), self.title)
    }
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

/// A top-level navigation section exported as its own document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    /// Original section title from the nav.
    pub name: String,
    /// Filename-safe slug (e.g. `Getting-Started`).
    pub slug: String,
    /// Existing files in navigation order.
    pub entries: Vec<NavEntry>,
}
