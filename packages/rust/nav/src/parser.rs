//! `mkdocs.yml` parser.
//!
//! MkDocs configs are YAML with Python-specific tags, e.g.
//! `format: !!python/name:pymdownx.superfences.fence_code_format` or
//! `!ENV [SITE_URL, "http://localhost"]`. Those tags are resolved according to
//! a [`TagPolicy`] so that the rest of the document parses normally.
//!
//! The `nav` key is an ordered list where each item is one of:
//! - `"page.md"`: a page without an explicit title
//! - `{ "Title": "page.md" }`: a titled page
//! - `{ "Section": [ ...items ] }`: a nested section

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use docexport_shared::{DocExportError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How tagged YAML nodes that are not plain data are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPolicy {
    /// Replace with a descriptive string (`<python_function:NAME>`).
    #[default]
    Placeholder,
    /// Replace with null.
    Ignore,
}

/// One node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// A markdown page, relative to `docs_dir`.
    Page { title: Option<String>, path: String },
    /// A titled group of child nodes.
    Section { title: String, children: Vec<NavNode> },
}

impl NavNode {
    /// Number of page leaves under (and including) this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            NavNode::Page { .. } => 1,
            NavNode::Section { children, .. } => children.iter().map(NavNode::leaf_count).sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// YAML loading
// ---------------------------------------------------------------------------

/// Matches `!!python/name:dotted.path` used as a whole scalar value.
static PYTHON_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)!!python/name:([\w.]+)[ \t]*(#.*)?$").expect("python/name regex")
});

/// Parse YAML text into a [`Value`] with tags resolved per `policy`.
pub fn parse_yaml(text: &str, policy: TagPolicy) -> Result<Value> {
    let text = PYTHON_NAME_RE.replace_all(text, |caps: &regex::Captures| match policy {
        TagPolicy::Placeholder => format!("'<python_function:{}>'", &caps[1]),
        TagPolicy::Ignore => "null".to_string(),
    });

    let value: Value = serde_yaml::from_str(&text)
        .map_err(|e| DocExportError::parse(format!("invalid mkdocs YAML: {e}")))?;

    Ok(resolve_tags(value, policy))
}

/// Recursively replace tagged nodes that survived parsing.
fn resolve_tags(value: Value, policy: TagPolicy) -> Value {
    match value {
        Value::Tagged(tagged) => match policy {
            TagPolicy::Placeholder => {
                let tag = tagged.tag.to_string();
                Value::String(format!("<tag:{}>", tag.trim_start_matches('!')))
            }
            TagPolicy::Ignore => Value::Null,
        },
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| resolve_tags(item, policy))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, resolve_tags(v, policy)))
                .collect(),
        ),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Nav parsing
// ---------------------------------------------------------------------------

/// Whether `text` is a placeholder left by [`TagPolicy::Placeholder`].
fn is_tag_placeholder(text: &str) -> bool {
    text.strip_suffix('>').is_some_and(|rest| {
        rest.starts_with("<tag:") || rest.starts_with("<python_function:")
    })
}

/// Build the navigation tree from the `nav` value. Order is preserved.
pub fn parse_nav(nav: &Value) -> Vec<NavNode> {
    match nav {
        Value::Sequence(items) => items.iter().flat_map(parse_item).collect(),
        Value::Mapping(map) => parse_mapping(map),
        Value::String(_) => parse_item(nav),
        other => {
            debug!(?other, "ignoring non-navigation value");
            Vec::new()
        }
    }
}

fn parse_item(item: &Value) -> Vec<NavNode> {
    match item {
        Value::String(path) if is_tag_placeholder(path) => {
            debug!(path, "ignoring tagged nav item");
            Vec::new()
        }
        Value::String(path) => vec![NavNode::Page {
            title: None,
            path: path.clone(),
        }],
        Value::Mapping(map) => parse_mapping(map),
        other => {
            debug!(?other, "ignoring non-navigation item");
            Vec::new()
        }
    }
}

fn parse_mapping(map: &Mapping) -> Vec<NavNode> {
    let mut nodes = Vec::new();

    for (key, value) in map {
        let Some(title) = key.as_str() else {
            debug!(?key, "ignoring nav entry with non-string title");
            continue;
        };

        match value {
            Value::String(path) if is_tag_placeholder(path) => {
                debug!(title, path, "ignoring tagged nav entry");
            }
            Value::String(path) => nodes.push(NavNode::Page {
                title: Some(title.to_string()),
                path: path.clone(),
            }),
            Value::Sequence(_) | Value::Mapping(_) => nodes.push(NavNode::Section {
                title: title.to_string(),
                children: parse_nav(value),
            }),
            other => debug!(title, ?other, "ignoring nav entry without a page"),
        }
    }

    nodes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MKDOCS: &str = r#"
site_name: Platform Handbook
theme:
  name: material
markdown_extensions:
  - pymdownx.superfences:
      custom_fences:
        - name: mermaid
          class: mermaid
          format: !!python/name:pymdownx.superfences.fence_code_format
nav:
  - index.md
  - Getting Started:
      - Install: guide/install.md
      - Configure: guide/configure.md
  - Reference:
      - API: reference/api.md
      - Deep:
          - Internals: reference/internals.md
  - About: about.md
"#;

    fn fence_format(value: &Value) -> &Value {
        &value["markdown_extensions"][0]["pymdownx.superfences"]["custom_fences"][0]["format"]
    }

    #[test]
    fn python_name_tag_becomes_placeholder() {
        let value = parse_yaml(MKDOCS, TagPolicy::Placeholder).expect("parse");
        assert_eq!(
            fence_format(&value).as_str(),
            Some("<python_function:pymdownx.superfences.fence_code_format>")
        );
    }

    #[test]
    fn python_name_tag_can_be_ignored() {
        let value = parse_yaml(MKDOCS, TagPolicy::Ignore).expect("parse");
        assert!(fence_format(&value).is_null());
    }

    #[test]
    fn local_tags_are_resolved() {
        let yaml = "site_url: !ENV [SITE_URL, 'http://localhost']\nnav: []\n";

        let value = parse_yaml(yaml, TagPolicy::Placeholder).expect("parse");
        assert_eq!(value["site_url"].as_str(), Some("<tag:ENV>"));

        let value = parse_yaml(yaml, TagPolicy::Ignore).expect("parse");
        assert!(value["site_url"].is_null());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_yaml("nav: [unclosed", TagPolicy::Placeholder).unwrap_err();
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn nav_tree_preserves_order_and_nesting() {
        let value = parse_yaml(MKDOCS, TagPolicy::Placeholder).expect("parse");
        let nav = parse_nav(&value["nav"]);

        assert_eq!(nav.len(), 4);
        assert_eq!(
            nav[0],
            NavNode::Page {
                title: None,
                path: "index.md".into()
            }
        );
        match &nav[1] {
            NavNode::Section { title, children } => {
                assert_eq!(title, "Getting Started");
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected section, got {other:?}"),
        }
        assert_eq!(nav.iter().map(NavNode::leaf_count).sum::<usize>(), 6);
    }

    #[test]
    fn multi_key_mapping_yields_nodes_in_order() {
        let value = parse_yaml("nav:\n  - B: b.md\n    A: a.md\n", TagPolicy::Placeholder)
            .expect("parse");
        let nav = parse_nav(&value["nav"]);
        let titles: Vec<_> = nav
            .iter()
            .map(|n| match n {
                NavNode::Page { title, .. } => title.clone().unwrap_or_default(),
                NavNode::Section { title, .. } => title.clone(),
            })
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn non_page_values_are_skipped() {
        let value = parse_yaml("nav:\n  - 42\n  - Empty:\n  - Ok: ok.md\n", TagPolicy::Placeholder)
            .expect("parse");
        let nav = parse_nav(&value["nav"]);
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn tagged_nav_items_are_skipped() {
        let yaml = "nav:\n  - !ENV [X, y]\n  - ok.md\n  - Dynamic: !ENV PAGE\n  - Hook: !!python/name:plugins.nav\n";
        for policy in [TagPolicy::Placeholder, TagPolicy::Ignore] {
            let value = parse_yaml(yaml, policy).expect("parse");
            let nav = parse_nav(&value["nav"]);
            assert_eq!(
                nav,
                vec![NavNode::Page {
                    title: None,
                    path: "ok.md".into()
                }],
                "{policy:?}"
            );
        }
    }
}
