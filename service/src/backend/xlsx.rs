//! XLSX workbook backend over `rust_xlsxwriter`.

use super::{CellRange, FreezePane, ListSource, RowId, RowRange, SheetId, WorkbookBackend};
use rust_xlsxwriter::{DataValidation, Format, Formula, Workbook, Worksheet, XlsxError};
use sheetcast_core::{CellValue, Result, SheetcastError, excel_serial};
use std::io::Write;
use std::path::Path;

/// Per-sheet state. Rows are written top-down, cells left-to-right, so the
/// backend only needs the next free row and the next free column of each
/// appended row. `workbook_index` can diverge from the handle index when a
/// failed rename leaves an orphan worksheet behind.
#[derive(Debug, Default)]
struct SheetCursor {
    workbook_index: usize,
    next_row: u32,
    row_cols: Vec<u16>,
}

/// Production workbook backend writing XLSX through `rust_xlsxwriter`.
pub struct XlsxBackend {
    workbook: Workbook,
    added: usize,
    names: Vec<String>,
    cursors: Vec<SheetCursor>,
}

impl Default for XlsxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxBackend {
    /// Create a backend with an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            added: 0,
            names: Vec::new(),
            cursors: Vec::new(),
        }
    }

    /// Serialize the workbook to an in-memory XLSX buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if workbook serialization fails.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        self.workbook.save_to_buffer().map_err(into_backend_error)
    }

    /// Serialize the workbook and write it to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if serialization or the write
    /// fails.
    pub fn save_to_writer<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let buffer = self.save_to_buffer()?;
        out.write_all(&buffer)
            .map_err(|e| SheetcastError::backend_with_source("failed to write workbook", e))
    }

    /// Serialize the workbook to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if serialization or the file
    /// write fails.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.workbook.save(path).map_err(into_backend_error)
    }

    fn worksheet(&mut self, sheet: SheetId) -> Result<&mut Worksheet> {
        let count = self.cursors.len();
        let Some(cursor) = self.cursors.get(sheet.0) else {
            return Err(SheetcastError::sheet_not_found(sheet.0, count));
        };
        self.workbook
            .worksheet_from_index(cursor.workbook_index)
            .map_err(into_backend_error)
    }

    fn cursor(&mut self, sheet: SheetId) -> Result<&mut SheetCursor> {
        let count = self.cursors.len();
        self.cursors
            .get_mut(sheet.0)
            .ok_or_else(|| SheetcastError::sheet_not_found(sheet.0, count))
    }
}

impl WorkbookBackend for XlsxBackend {
    fn create_sheet(&mut self, name: &str) -> Result<SheetId> {
        if self.names.iter().any(|n| n == name) {
            return Err(SheetcastError::backend(format!(
                "sheet name '{name}' already in use"
            )));
        }

        let workbook_index = self.added;
        self.added += 1;
        self.workbook
            .add_worksheet()
            .set_name(name)
            .map_err(into_backend_error)?;

        self.names.push(name.to_string());
        self.cursors.push(SheetCursor {
            workbook_index,
            ..SheetCursor::default()
        });
        Ok(SheetId(self.cursors.len() - 1))
    }

    fn append_row(&mut self, sheet: SheetId) -> Result<RowId> {
        let cursor = self.cursor(sheet)?;
        let row = cursor.next_row;
        cursor.next_row += 1;
        cursor.row_cols.push(0);
        Ok(RowId(row))
    }

    fn append_cell(
        &mut self,
        sheet: SheetId,
        row: RowId,
        value: &CellValue,
        format: Option<&str>,
    ) -> Result<()> {
        let cursor = self.cursor(sheet)?;
        let col = *cursor
            .row_cols
            .get(row.0 as usize)
            .ok_or_else(|| SheetcastError::backend(format!("row {} was never appended", row.0)))?;
        cursor.row_cols[row.0 as usize] = col + 1;

        let format = format.map(|f| Format::new().set_num_format(f));
        let worksheet = self.worksheet(sheet)?;
        write_cell(worksheet, row.0, col, value, format.as_ref()).map_err(into_backend_error)?;
        Ok(())
    }

    fn set_column_width(&mut self, sheet: SheetId, col: u16, width: f64) -> Result<()> {
        self.worksheet(sheet)?
            .set_column_width(col, width)
            .map_err(into_backend_error)?;
        Ok(())
    }

    fn set_auto_filter(&mut self, sheet: SheetId, range: CellRange) -> Result<()> {
        self.worksheet(sheet)?
            .autofilter(
                range.first_row,
                range.first_col,
                range.last_row,
                range.last_col,
            )
            .map_err(into_backend_error)?;
        Ok(())
    }

    fn set_freeze_pane(&mut self, sheet: SheetId, pane: FreezePane) -> Result<()> {
        let worksheet = self.worksheet(sheet)?;
        match pane {
            FreezePane::None => {}
            FreezePane::FirstRow => {
                worksheet.set_freeze_panes(1, 0).map_err(into_backend_error)?;
            }
            FreezePane::FirstColumn => {
                worksheet.set_freeze_panes(0, 1).map_err(into_backend_error)?;
            }
        }
        Ok(())
    }

    fn set_hidden(&mut self, sheet: SheetId, hidden: bool) -> Result<()> {
        self.worksheet(sheet)?.set_hidden(hidden);
        Ok(())
    }

    fn add_list_validation(
        &mut self,
        sheet: SheetId,
        rows: RowRange,
        col: u16,
        source: ListSource<'_>,
    ) -> Result<()> {
        let validation = match source {
            ListSource::Inline(values) => {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                DataValidation::new()
                    .allow_list_strings(&values)
                    .map_err(into_backend_error)?
            }
            ListSource::Sheet(name) => {
                let last = rows.last.saturating_sub(rows.first) + 1;
                let formula = Formula::new(format!("='{name}'!$A$1:$A${last}"));
                DataValidation::new().allow_list_formula(formula)
            }
        };

        self.worksheet(sheet)?
            .add_data_validation(rows.first, col, rows.last, col, &validation)
            .map_err(into_backend_error)?;
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> std::result::Result<(), XlsxError> {
    match (value, format) {
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Empty, None) => {
            worksheet.write_string(row, col, "")?;
        }
        (CellValue::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Int(i), Some(format)) => {
            worksheet.write_number_with_format(row, col, *i as f64, format)?;
        }
        (CellValue::Int(i), None) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        (CellValue::Float(v), Some(format)) => {
            worksheet.write_number_with_format(row, col, *v, format)?;
        }
        (CellValue::Float(v), None) => {
            worksheet.write_number(row, col, *v)?;
        }
        (CellValue::Text(s), Some(format)) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        (CellValue::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        // Timestamps land as serial day numbers; the column format carries
        // the date rendering.
        (CellValue::DateTime(dt), Some(format)) => {
            worksheet.write_number_with_format(row, col, excel_serial(dt), format)?;
        }
        (CellValue::DateTime(dt), None) => {
            worksheet.write_number(row, col, excel_serial(dt))?;
        }
    }
    Ok(())
}

fn into_backend_error(err: XlsxError) -> SheetcastError {
    SheetcastError::backend(err.to_string())
}
