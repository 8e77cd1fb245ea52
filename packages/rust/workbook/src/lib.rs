//! Multi-sheet staffing workbook export.
//!
//! A [`Dataset`] is an ordered list of sheets, each a header row plus data
//! rows. The built-in [`staffing_dataset`] can be replaced by a TOML file of
//! the same shape:
//!
//! ```toml
//! [[sheets]]
//! name = "Phases"
//! rows = [["Phase", "Person-Days"], ["Study", 40], ["TOTAL", 40]]
//! ```

mod layout;
mod model;
mod staffing;
mod writer;

pub use layout::{MAX_COLUMN_WIDTH, RowStyle, column_widths, row_style};
pub use model::{Cell, Dataset, MAX_SHEET_NAME_LEN, Sheet};
pub use staffing::staffing_dataset;
pub use writer::{build_workbook, workbook_bytes, write_workbook};

/// Workbook file name for a project prefix.
pub fn workbook_file_name(prefix: &str) -> String {
    format!("{prefix}_Weekly_Workload_Breakdown.xlsx")
}
