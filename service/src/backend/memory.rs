//! In-memory workbook backend.
//!
//! Records every operation instead of encoding a file. Used by the test
//! suites to assert on generated cells, and useful to callers that want the
//! tabulated form of their records without an XLSX file.

use super::{CellRange, FreezePane, ListSource, RowId, RowRange, SheetId, WorkbookBackend};
use sheetcast_core::{CellValue, Result, SheetcastError};

/// One recorded cell: its value and the number format it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCell {
    /// Cell value
    pub value: CellValue,
    /// Number format, if any
    pub format: Option<String>,
}

/// A recorded list validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryValidation {
    /// Rows the validation covers
    pub rows: RowRange,
    /// Column the validation covers
    pub col: u16,
    /// Inline allowed values, when the source was inline
    pub inline_values: Vec<String>,
    /// External source sheet, when the source was a sheet reference
    pub sheet: Option<String>,
}

/// One recorded sheet.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    /// Sheet name
    pub name: String,
    /// Appended rows of cells
    pub rows: Vec<Vec<MemoryCell>>,
    /// Column widths set on this sheet
    pub column_widths: Vec<(u16, f64)>,
    /// Autofilter range, if one was applied
    pub auto_filter: Option<CellRange>,
    /// Freeze pane applied to the sheet
    pub freeze: FreezePane,
    /// Hidden flag
    pub hidden: bool,
    /// List validations attached to the sheet
    pub validations: Vec<MemoryValidation>,
}

impl MemorySheet {
    /// The values of one row, without formats.
    #[must_use]
    pub fn row_values(&self, row: usize) -> Vec<&CellValue> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(|c| &c.value).collect())
            .unwrap_or_default()
    }

    /// The values of one row rendered to strings.
    #[must_use]
    pub fn row_strings(&self, row: usize) -> Vec<String> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(|c| c.value.to_string()).collect())
            .unwrap_or_default()
    }
}

/// Recording workbook backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sheets: Vec<MemorySheet>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded sheets, in creation order.
    #[must_use]
    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    /// One recorded sheet by index.
    #[must_use]
    pub fn sheet(&self, index: usize) -> Option<&MemorySheet> {
        self.sheets.get(index)
    }

    fn sheet_mut(&mut self, sheet: SheetId) -> Result<&mut MemorySheet> {
        let count = self.sheets.len();
        self.sheets
            .get_mut(sheet.0)
            .ok_or_else(|| SheetcastError::sheet_not_found(sheet.0, count))
    }
}

impl WorkbookBackend for MemoryBackend {
    fn create_sheet(&mut self, name: &str) -> Result<SheetId> {
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(SheetcastError::backend(format!(
                "sheet name '{name}' already in use"
            )));
        }
        self.sheets.push(MemorySheet {
            name: name.to_string(),
            ..MemorySheet::default()
        });
        Ok(SheetId(self.sheets.len() - 1))
    }

    fn append_row(&mut self, sheet: SheetId) -> Result<RowId> {
        let sheet = self.sheet_mut(sheet)?;
        sheet.rows.push(Vec::new());
        Ok(RowId(u32::try_from(sheet.rows.len() - 1).unwrap_or(u32::MAX)))
    }

    fn append_cell(
        &mut self,
        sheet: SheetId,
        row: RowId,
        value: &CellValue,
        format: Option<&str>,
    ) -> Result<()> {
        let sheet = self.sheet_mut(sheet)?;
        let row = sheet
            .rows
            .get_mut(row.0 as usize)
            .ok_or_else(|| SheetcastError::backend(format!("row {} was never appended", row.0)))?;
        row.push(MemoryCell {
            value: value.clone(),
            format: format.map(ToString::to_string),
        });
        Ok(())
    }

    fn set_column_width(&mut self, sheet: SheetId, col: u16, width: f64) -> Result<()> {
        self.sheet_mut(sheet)?.column_widths.push((col, width));
        Ok(())
    }

    fn set_auto_filter(&mut self, sheet: SheetId, range: CellRange) -> Result<()> {
        self.sheet_mut(sheet)?.auto_filter = Some(range);
        Ok(())
    }

    fn set_freeze_pane(&mut self, sheet: SheetId, pane: FreezePane) -> Result<()> {
        self.sheet_mut(sheet)?.freeze = pane;
        Ok(())
    }

    fn set_hidden(&mut self, sheet: SheetId, hidden: bool) -> Result<()> {
        self.sheet_mut(sheet)?.hidden = hidden;
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
            ListSource::Inline(values) => MemoryValidation {
                rows,
                col,
                inline_values: values.to_vec(),
                sheet: None,
            },
            ListSource::Sheet(name) => MemoryValidation {
                rows,
                col,
                inline_values: Vec::new(),
                sheet: Some(name.to_string()),
            },
        };
        self.sheet_mut(sheet)?.validations.push(validation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_cells_in_append_order() -> Result<()> {
        let mut backend = MemoryBackend::new();
        let sheet = backend.create_sheet("data")?;
        let row = backend.append_row(sheet)?;
        backend.append_cell(sheet, row, &CellValue::Int(1), None)?;
        backend.append_cell(sheet, row, &CellValue::Float(2.2), Some("0.00"))?;

        let recorded = backend.sheet(0).expect("sheet recorded");
        assert_eq!(recorded.row_strings(0), vec!["1", "2.2"]);
        assert_eq!(recorded.rows[0][1].format.as_deref(), Some("0.00"));
        Ok(())
    }

    #[test]
    fn test_duplicate_sheet_name_is_backend_error() -> Result<()> {
        let mut backend = MemoryBackend::new();
        backend.create_sheet("orders")?;
        let err = backend.create_sheet("orders").unwrap_err();
        assert!(matches!(err, SheetcastError::Backend { .. }));
        Ok(())
    }
}
