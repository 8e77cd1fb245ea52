//! Heading-level rewriting for nesting a page under a generated section title.
//!
//! Lines are split on `\n` and re-joined with `\n`, so everything that is not
//! a rewritten heading survives byte-for-byte (including `\r` before `\n`).

/// Deepest heading level markdown supports.
const MAX_LEVEL: i32 = 6;

/// Shift every ATX heading by `delta` levels, clamped to `1..=6`.
///
/// A zero delta returns the input unchanged. Lines inside fenced code blocks
/// are never treated as headings, so shell comments such as `# install` in a
/// ```` ```bash ```` block are left alone.
pub fn adjust_heading_levels(content: &str, delta: i32) -> String {
    if delta == 0 {
        return content.to_string();
    }

    let mut fence: Option<&str> = None;
    let mut lines: Vec<String> = Vec::new();

    for line in content.split('\n') {
        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some(open) if open == marker => fence = None,
                Some(_) => {}
            }
            lines.push(line.to_string());
            continue;
        }

        if fence.is_some() {
            lines.push(line.to_string());
            continue;
        }

        match parse_heading(line) {
            Some((level, text)) => lines.push(render_heading(shift(level, delta), text)),
            None => lines.push(line.to_string()),
        }
    }

    lines.join("\n")
}

/// Parse an ATX heading: one or more `#` followed by whitespace or end of line.
///
/// Returns the level (count of leading `#`) and the trimmed heading text.
pub(crate) fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 {
        return None;
    }

    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        // `#hashtag`, not a heading
        return None;
    }

    Some((level, rest.trim()))
}

/// Detect a code fence opener/closer, returning its marker.
fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn shift(level: usize, delta: i32) -> usize {
    let level = i32::try_from(level).unwrap_or(MAX_LEVEL);
    level.saturating_add(delta).clamp(1, MAX_LEVEL) as usize
}

fn render_heading(level: usize, text: &str) -> String {
    let hashes = "#".repeat(level);
    if text.is_empty() {
        hashes
    } else {
        format!("{hashes} {text}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_is_identity() {
        let input = "#  Loose   \n\n##Tight\ntext\r\n```\n# comment\n";
        assert_eq!(adjust_heading_levels(input, 0), input);
    }

    #[test]
    fn shifts_headings_down() {
        let input = "# Title\n\nBody\n\n## Section\n### Deep";
        let result = adjust_heading_levels(input, 1);
        assert_eq!(result, "## Title\n\nBody\n\n### Section\n#### Deep");
    }

    #[test]
    fn clamps_to_six() {
        let input = "##### Five\n###### Six";
        let result = adjust_heading_levels(input, 2);
        assert_eq!(result, "###### Five\n###### Six");
    }

    #[test]
    fn clamps_to_one() {
        let input = "## Two\n# One";
        let result = adjust_heading_levels(input, -3);
        assert_eq!(result, "# Two\n# One");
    }

    #[test]
    fn trims_heading_text() {
        let result = adjust_heading_levels("#    Spaced out   ", 1);
        assert_eq!(result, "## Spaced out");
    }

    #[test]
    fn empty_heading_keeps_only_hashes() {
        assert_eq!(adjust_heading_levels("#", 1), "##");
    }

    #[test]
    fn hashtags_are_not_headings() {
        let input = "#hashtag\n#!/bin/sh\n# Real";
        let result = adjust_heading_levels(input, 1);
        assert_eq!(result, "#hashtag\n#!/bin/sh\n## Real");
    }

    #[test]
    fn code_fences_are_skipped() {
        let input = "# Setup\n```bash\n# install deps\nmake\n```\n## Next\n~~~\n# also code\n~~~";
        let result = adjust_heading_levels(input, 1);
        assert_eq!(
            result,
            "## Setup\n```bash\n# install deps\nmake\n```\n### Next\n~~~\n# also code\n~~~"
        );
    }

    #[test]
    fn non_heading_lines_preserved_byte_for_byte() {
        let input = "plain\r\n  indented  \n\ttabbed\n";
        assert_eq!(adjust_heading_levels(input, 3), input);
    }

    #[test]
    fn levels_never_leave_valid_range() {
        let input = (1..=6)
            .map(|n| format!("{} h{n}", "#".repeat(n)))
            .collect::<Vec<_>>()
            .join("\n");

        for delta in (-7..=7).chain([i32::MIN, i32::MIN + 1, i32::MAX - 1, i32::MAX]) {
            let result = adjust_heading_levels(&input, delta);
            for line in result.lines() {
                let (level, _) = parse_heading(line).expect("still a heading");
                assert!((1..=6).contains(&level), "delta={delta} line={line}");
            }
        }
    }

    #[test]
    fn extreme_deltas_saturate() {
        assert_eq!(adjust_heading_levels("# a\n###### b", i32::MAX), "###### a\n###### b");
        assert_eq!(adjust_heading_levels("# a\n###### b", i32::MIN), "# a\n# b");
    }

    #[test]
    fn parse_heading_reports_level_and_text() {
        assert_eq!(parse_heading("### Title "), Some((3, "Title")));
        assert_eq!(parse_heading("Title"), None);
        assert_eq!(parse_heading("#x"), None);
    }
}
