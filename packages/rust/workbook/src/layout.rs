//! Styling and sizing rules, independent of the xlsx writer.

use crate::model::Cell;

/// Upper bound for an auto-sized column.
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Extra width added to the longest value in a column.
const COLUMN_PADDING: usize = 2;

/// Header fill.
pub const HEADER_FILL: u32 = 0x366092;

/// Total-row fill.
pub const TOTAL_FILL: u32 = 0xD9E1F2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// Bold white text on [`HEADER_FILL`], centred.
    Header,
    /// Bold text on [`TOTAL_FILL`].
    Total,
    Plain,
}

/// Style for the row at 0-based `index`. Only the first row is a header; a
/// later row is a total row when its first cell mentions "total".
pub fn row_style(index: usize, row: &[Cell]) -> RowStyle {
    if index == 0 {
        return RowStyle::Header;
    }

    let is_total = row
        .first()
        .and_then(Cell::as_text)
        .is_some_and(|text| text.to_lowercase().contains("total"));
    if is_total {
        RowStyle::Total
    } else {
        RowStyle::Plain
    }
}

/// Width of every column: longest rendered value plus padding, capped.
pub fn column_widths(rows: &[Vec<Cell>]) -> Vec<usize> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];

    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.rendered().chars().count());
        }
    }

    widths
        .into_iter()
        .map(|w| (w + COLUMN_PADDING).min(MAX_COLUMN_WIDTH))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|&c| Cell::from(c)).collect()
    }

    #[test]
    fn only_first_row_is_header() {
        let header = row(&["Phase", "Weekly Total (Days)"]);
        assert_eq!(row_style(0, &header), RowStyle::Header);
        assert_eq!(row_style(1, &header), RowStyle::Plain);
    }

    #[test]
    fn total_rows_detected_case_insensitively() {
        assert_eq!(row_style(3, &row(&["TOTAL", ""])), RowStyle::Total);
        assert_eq!(row_style(3, &row(&["Grand total"])), RowStyle::Total);
        assert_eq!(row_style(3, &row(&["Design", "Total"])), RowStyle::Plain);
        assert_eq!(row_style(3, &[Cell::Number(1.0)]), RowStyle::Plain);
        assert_eq!(row_style(3, &[]), RowStyle::Plain);
    }

    #[test]
    fn widths_pad_and_cap() {
        let long = "x".repeat(80);
        let rows = vec![
            row(&["Phase", "Notes"]),
            vec![Cell::from("Implementation Phase"), Cell::from(long.as_str())],
            vec![Cell::Number(2011.5)],
        ];
        assert_eq!(column_widths(&rows), vec![22, 50]);
        assert!(column_widths(&[]).is_empty());
    }
}
