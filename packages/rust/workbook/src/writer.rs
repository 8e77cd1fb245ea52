//! xlsx output via `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet, XlsxError};
use tracing::{debug, info, instrument};

use docexport_shared::{DocExportError, Result};

use crate::layout::{HEADER_FILL, RowStyle, TOTAL_FILL, column_widths, row_style};
use crate::model::{Cell, Dataset, Sheet};

fn xlsx_error(e: XlsxError) -> DocExportError {
    DocExportError::Workbook(e.to_string())
}

struct Formats {
    header: Format,
    total: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            total: Format::new()
                .set_bold()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(TOTAL_FILL)),
        }
    }

    fn for_style(&self, style: RowStyle) -> Option<&Format> {
        match style {
            RowStyle::Header => Some(&self.header),
            RowStyle::Total => Some(&self.total),
            RowStyle::Plain => None,
        }
    }
}

/// Build the in-memory workbook, one worksheet per sheet in order.
pub fn build_workbook(dataset: &Dataset) -> Result<Workbook> {
    dataset.validate()?;

    let formats = Formats::new();
    let mut workbook = Workbook::new();
    for sheet in &dataset.sheets {
        let worksheet = workbook.add_worksheet();
        fill_worksheet(worksheet, sheet, &formats)?;
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "wrote sheet");
    }
    Ok(workbook)
}

fn fill_worksheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &Formats) -> Result<()> {
    worksheet.set_name(sheet.name.trim()).map_err(xlsx_error)?;

    for (r, row) in sheet.rows.iter().enumerate() {
        let row_num = u32::try_from(r)
            .map_err(|_| DocExportError::validation(format!("too many rows in '{}'", sheet.name)))?;
        let format = formats.for_style(row_style(r, row));

        for (c, cell) in row.iter().enumerate() {
            let col = column_index(c, &sheet.name)?;
            match (cell, format) {
                (Cell::Text(s), Some(f)) => worksheet.write_string_with_format(row_num, col, s, f),
                (Cell::Text(s), None) => worksheet.write_string(row_num, col, s),
                (Cell::Number(n), Some(f)) => worksheet.write_number_with_format(row_num, col, *n, f),
                (Cell::Number(n), None) => worksheet.write_number(row_num, col, *n),
            }
            .map_err(xlsx_error)?;
        }
    }

    for (c, width) in column_widths(&sheet.rows).into_iter().enumerate() {
        let col = column_index(c, &sheet.name)?;
        worksheet
            .set_column_width(col, width as f64)
            .map_err(xlsx_error)?;
    }
    Ok(())
}

fn column_index(c: usize, sheet: &str) -> Result<u16> {
    u16::try_from(c).map_err(|_| DocExportError::validation(format!("too many columns in '{sheet}'")))
}

/// Write `dataset` to `path`, creating parent directories as needed.
#[instrument(skip_all, fields(path = %path.display(), sheets = dataset.sheets.len()))]
pub fn write_workbook(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(dataset)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocExportError::io(parent, e))?;
    }
    workbook.save(path).map_err(xlsx_error)?;

    info!(sheets = ?dataset.sheet_names(), "workbook created");
    Ok(())
}

/// Serialise `dataset` to xlsx bytes.
pub fn workbook_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    build_workbook(dataset)?.save_to_buffer().map_err(xlsx_error)
}
