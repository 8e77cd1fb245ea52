//! Sheet data model and validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docexport_shared::{DocExportError, Result};

/// Excel's limit on worksheet name length.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel rejects in worksheet names.
const FORBIDDEN_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// One cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text as shown in the sheet, used for column sizing.
    pub fn rendered(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(f64::from(n))
    }
}

/// A named worksheet: header row first, then data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

/// An ordered set of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Dataset {
    /// Parse a `[[sheets]]` TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let dataset: Dataset = toml::from_str(text)
            .map_err(|e| DocExportError::parse(format!("invalid workload data: {e}")))?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DocExportError::io(path, e))?;
        debug!(path = %path.display(), "loaded workload data");
        Self::from_toml(&text)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Sheet names must be non-empty, unique, at most 31 characters, and free
    /// of characters Excel rejects.
    pub fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(DocExportError::validation("workbook has no sheets"));
        }

        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            let name = sheet.name.trim();
            if name.is_empty() {
                return Err(DocExportError::validation("sheet name must not be empty"));
            }
            if name.chars().count() > MAX_SHEET_NAME_LEN {
                return Err(DocExportError::validation(format!(
                    "sheet name '{name}' exceeds {MAX_SHEET_NAME_LEN} characters"
                )));
            }
            if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
                return Err(DocExportError::validation(format!(
                    "sheet name '{name}' contains forbidden character '{c}'"
                )));
            }
            // Excel compares sheet names case-insensitively.
            if !seen.insert(name.to_lowercase()) {
                return Err(DocExportError::validation(format!("duplicate sheet name '{name}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str) -> Sheet {
        Sheet {
            name: name.into(),
            rows: vec![vec!["A".into()]],
        }
    }

    #[test]
    fn parses_mixed_cells_from_toml() {
        let data = Dataset::from_toml(
            r#"
[[sheets]]
name = "Plan"
rows = [["Phase", "Days"], ["Study", 40], ["Build", 2.5]]
"#,
        )
        .expect("parse");

        assert_eq!(data.sheet_names(), vec!["Plan"]);
        assert_eq!(data.sheets[0].rows[1], vec![Cell::from("Study"), Cell::Number(40.0)]);
        assert_eq!(data.sheets[0].rows[2][1], Cell::Number(2.5));
    }

    #[test]
    fn rendered_numbers_drop_trailing_zero() {
        assert_eq!(Cell::Number(60.0).rendered(), "60");
        assert_eq!(Cell::Number(32.5).rendered(), "32.5");
    }

    #[test]
    fn rejects_bad_sheet_names() {
        let long = "x".repeat(32);
        for (sheets, needle) in [
            (vec![], "no sheets"),
            (vec![sheet("  ")], "empty"),
            (vec![sheet(&long)], "exceeds"),
            (vec![sheet("a/b")], "forbidden"),
            (vec![sheet("Plan"), sheet("plan")], "duplicate"),
        ] {
            let err = Dataset { sheets }.validate().unwrap_err();
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn thirty_one_characters_is_allowed() {
        let data = Dataset {
            sheets: vec![sheet(&"x".repeat(31))],
        };
        assert!(data.validate().is_ok());
    }
}
