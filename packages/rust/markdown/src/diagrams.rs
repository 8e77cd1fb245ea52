//! Mermaid diagram blocks: detection, classification, and replacement with
//! rendered image references.
//!
//! Rendering itself is delegated to a [`DiagramRenderer`] so this module never
//! touches external tools.

use std::future::Future;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use docexport_shared::{DocExportError, Result};

/// Renders one diagram's source code into an image file.
pub trait DiagramRenderer {
    /// Render `code` into `output`. Any error means the caller falls back to
    /// showing the code.
    fn render(&self, code: &str, output: &Path) -> impl Future<Output = Result<()>>;
}

/// A fenced ```` ```mermaid ```` block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Byte span of the whole block, fences included.
    pub span: Range<usize>,
    /// Raw code between the fences.
    pub code: String,
}

/// Counters from one [`replace_diagrams`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramStats {
    pub found: usize,
    pub rendered: usize,
}

impl DiagramStats {
    pub fn failed(&self) -> usize {
        self.found - self.rendered
    }
}

impl std::ops::AddAssign for DiagramStats {
    fn add_assign(&mut self, rhs: Self) {
        self.found += rhs.found;
        self.rendered += rhs.rendered;
    }
}

/// Locate every mermaid block in `content`, in document order.
pub fn find_diagram_blocks(content: &str) -> Vec<DiagramBlock> {
    static MERMAID_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```mermaid\n(.*?)\n```").expect("valid regex"));

    MERMAID_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let code = caps.get(1)?;
            Some(DiagramBlock {
                span: whole.range(),
                code: code.as_str().to_string(),
            })
        })
        .collect()
}

/// Strip the trailing `%` that some editors leave behind, then surrounding
/// whitespace. A stray `%` at the end is a mermaid syntax error.
pub fn clean_diagram_code(code: &str) -> String {
    code.trim_end_matches(['%', ' ', '\t', '\n', '\r'])
        .trim()
        .to_string()
}

/// Human-readable diagram kind, used for captions.
pub fn classify(code: &str) -> &'static str {
    if code.contains("graph ") || code.contains("flowchart ") {
        "Flowchart/Graph Diagram"
    } else if code.contains("sequenceDiagram") {
        "Sequence Diagram"
    } else if code.contains("gantt") {
        "Gantt Chart"
    } else if code.contains("pie") {
        "Pie Chart"
    } else if code.contains("classDiagram") {
        "Class Diagram"
    } else if code.contains("erDiagram") {
        "Entity Relationship Diagram"
    } else if code.contains("journey") {
        "User Journey Diagram"
    } else {
        "Diagram"
    }
}

/// First 8 hex digits of the SHA-256 of the cleaned code.
pub fn short_hash(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    let hex = format!("{digest:x}");
    hex[..8].to_string()
}

/// Replace every mermaid block with a rendered image reference.
///
/// Block `k` (1-based) is rendered to `mermaid_diagram_<k>_<hash>.png` inside
/// `images_dir`. When rendering fails the cleaned code is saved as
/// `failed_mermaid_<k>_<hash>.mmd` next to it and the block becomes a plain
/// code listing. Text outside the blocks is copied unchanged.
pub async fn replace_diagrams<R: DiagramRenderer>(
    content: &str,
    images_dir: &Path,
    renderer: &R,
) -> (String, DiagramStats) {
    let blocks = find_diagram_blocks(content);
    let mut stats = DiagramStats::default();
    if blocks.is_empty() {
        return (content.to_string(), stats);
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;

    for (i, block) in blocks.iter().enumerate() {
        let index = i + 1;
        out.push_str(&content[cursor..block.span.start]);
        cursor = block.span.end;
        stats.found += 1;

        let code = clean_diagram_code(&block.code);
        let hash = short_hash(&code);
        let kind = classify(&code);
        let image_path = images_dir.join(format!("mermaid_diagram_{index}_{hash}.png"));

        debug!(
            index,
            kind,
            preview = code.lines().next().unwrap_or("empty"),
            "rendering diagram"
        );

        match renderer.render(&code, &image_path).await {
            Ok(()) => {
                stats.rendered += 1;
                out.push_str(&image_reference(kind, &image_path));
            }
            Err(e) => {
                warn!(index, kind, error = %e, "diagram rendering failed, keeping code");
                if let Err(e) = save_failed_diagram(images_dir, index, &hash, &code) {
                    warn!(error = %e, "could not save failing diagram");
                }
                out.push_str(&code_fallback(kind, &code));
            }
        }
    }

    out.push_str(&content[cursor..]);

    info!(
        found = stats.found,
        rendered = stats.rendered,
        "processed mermaid diagrams"
    );

    (out, stats)
}

fn image_reference(kind: &str, image_path: &Path) -> String {
    format!("\n**{kind}**\n\n![{kind}]({})\n\n", image_path.display())
}

fn code_fallback(kind: &str, code: &str) -> String {
    format!(
        "\n**[Mermaid {kind} - Rendering Failed]**\n\n```\n{code}\n```\n\n*Note: Diagram rendering failed, showing code instead.*\n\n"
    )
}

fn save_failed_diagram(images_dir: &Path, index: usize, hash: &str, code: &str) -> Result<PathBuf> {
    let path = images_dir.join(format!("failed_mermaid_{index}_{hash}.mmd"));
    std::fs::write(&path, code).map_err(|e| DocExportError::io(&path, e))?;
    info!(path = %path.display(), "saved failing diagram");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Writes a placeholder image, or fails for code containing `BROKEN`.
    struct FakeRenderer {
        calls: RefCell<Vec<String>>,
    }

    impl FakeRenderer {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DiagramRenderer for FakeRenderer {
        async fn render(&self, code: &str, output: &Path) -> Result<()> {
            self.calls.borrow_mut().push(code.to_string());
            if code.contains("BROKEN") {
                return Err(DocExportError::validation("syntax error"));
            }
            std::fs::write(output, b"png").map_err(|e| DocExportError::io(output, e))
        }
    }

    #[test]
    fn finds_blocks_non_greedily() {
        let doc = "a\n```mermaid\ngraph TD\n```\nb\n```mermaid\npie\n```\n";
        let blocks = find_diagram_blocks(doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code, "graph TD");
        assert_eq!(blocks[1].code, "pie");
        assert_eq!(&doc[blocks[0].span.clone()], "```mermaid\ngraph TD\n```");
    }

    #[test]
    fn ignores_other_languages() {
        let doc = "```rust\nfn main() {}\n```\n```mermaidx\nno\n```";
        assert!(find_diagram_blocks(doc).is_empty());
    }

    #[test]
    fn cleans_trailing_percent() {
        assert_eq!(clean_diagram_code("  graph TD\n  A-->B\n%\n"), "graph TD\n  A-->B");
        assert_eq!(clean_diagram_code("pie %% comment\n%%"), "pie %% comment");
    }

    #[test]
    fn classifies_in_priority_order() {
        assert_eq!(classify("graph TD\nA-->B"), "Flowchart/Graph Diagram");
        assert_eq!(classify("flowchart LR"), "Flowchart/Graph Diagram");
        assert_eq!(classify("sequenceDiagram\nA->>B: hi"), "Sequence Diagram");
        assert_eq!(classify("gantt\ntitle Plan"), "Gantt Chart");
        assert_eq!(classify("pie title Pets"), "Pie Chart");
        assert_eq!(classify("classDiagram\nA <|-- B"), "Class Diagram");
        assert_eq!(classify("erDiagram\nA ||--o{ B : has"), "Entity Relationship Diagram");
        assert_eq!(classify("journey\ntitle Day"), "User Journey Diagram");
        assert_eq!(classify("stateDiagram-v2"), "Diagram");
    }

    #[test]
    fn short_hash_is_stable() {
        let a = short_hash("graph TD");
        assert_eq!(a.len(), 8);
        assert_eq!(a, short_hash("graph TD"));
        assert_ne!(a, short_hash("graph LR"));
    }

    #[tokio::test]
    async fn successful_render_becomes_image_reference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = FakeRenderer::new();
        let doc = "Intro\n```mermaid\nsequenceDiagram\nA->>B: hi\n```\nOutro";

        let (out, stats) = replace_diagrams(doc, dir.path(), &renderer).await;

        assert_eq!(stats, DiagramStats { found: 1, rendered: 1 });
        let hash = short_hash("sequenceDiagram\nA->>B: hi");
        let image = dir.path().join(format!("mermaid_diagram_1_{hash}.png"));
        assert!(image.exists());
        assert_eq!(
            out,
            format!(
                "Intro\n\n**Sequence Diagram**\n\n![Sequence Diagram]({})\n\n\nOutro",
                image.display()
            )
        );
    }

    #[tokio::test]
    async fn failed_render_falls_back_to_code_and_saves_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = FakeRenderer::new();
        let doc = "```mermaid\ngraph TD\nBROKEN\n%\n```";

        let (out, stats) = replace_diagrams(doc, dir.path(), &renderer).await;

        assert_eq!(stats.failed(), 1);
        assert!(out.contains("**[Mermaid Flowchart/Graph Diagram - Rendering Failed]**"));
        assert!(out.contains("```\ngraph TD\nBROKEN\n```"));
        assert!(out.contains("*Note: Diagram rendering failed, showing code instead.*"));

        let hash = short_hash("graph TD\nBROKEN");
        let saved = dir.path().join(format!("failed_mermaid_1_{hash}.mmd"));
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "graph TD\nBROKEN");
    }

    #[tokio::test]
    async fn text_outside_blocks_is_preserved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = FakeRenderer::new();
        let before = "# Title\r\n\ttabs & ünïcödé  \n";
        let middle = "\n\nbetween *blocks*\n";
        let after = "\ntrailing   ";
        let doc = format!(
            "{before}```mermaid\npie\n```{middle}```mermaid\nBROKEN\n```{after}"
        );

        let (out, stats) = replace_diagrams(&doc, dir.path(), &renderer).await;

        assert_eq!(stats.found, 2);
        assert!(out.starts_with(before));
        assert!(out.ends_with(after));
        assert!(out.contains(middle));
        assert_eq!(*renderer.calls.borrow(), vec!["pie", "BROKEN"]);
    }

    #[tokio::test]
    async fn document_without_diagrams_is_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = FakeRenderer::new();
        let doc = "no diagrams here\n```\ncode\n```\n";

        let (out, stats) = replace_diagrams(doc, dir.path(), &renderer).await;

        assert_eq!(out, doc);
        assert_eq!(stats, DiagramStats::default());
        assert!(renderer.calls.borrow().is_empty());
    }
}
