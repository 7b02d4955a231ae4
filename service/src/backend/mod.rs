//! Workbook backends
//!
//! The generation engine never touches a spreadsheet file directly; it
//! drives a [`WorkbookBackend`] through stable [`SheetId`] handles. The
//! [`xlsx`] backend produces real XLSX output via `rust_xlsxwriter`; the
//! [`memory`] backend records every operation for inspection and is what
//! the test suites assert against.

pub mod memory;
pub mod xlsx;

pub use memory::{MemoryBackend, MemoryCell, MemorySheet};
pub use xlsx::XlsxBackend;

use serde::Serialize;
use sheetcast_core::{CellValue, Result};

/// Stable handle to one sheet within a backend's workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SheetId(pub usize);

/// Handle to one appended row of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowId(pub u32);

/// Freeze-pane request for a sheet. First-row and first-column freezing
/// are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FreezePane {
    /// No frozen panes
    #[default]
    None,
    /// Keep the header row visible while scrolling
    FirstRow,
    /// Keep the first column visible while scrolling
    FirstColumn,
}

/// Rectangular cell range, inclusive on both ends, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRange {
    /// First row of the range
    pub first_row: u32,
    /// First column of the range
    pub first_col: u16,
    /// Last row of the range
    pub last_row: u32,
    /// Last column of the range
    pub last_col: u16,
}

/// Inclusive row span within one column, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowRange {
    /// First row of the span
    pub first: u32,
    /// Last row of the span
    pub last: u32,
}

/// Source of the allowed values for a list validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListSource<'a> {
    /// Literal values embedded in the validation rule
    Inline(&'a [String]),
    /// Reference to the first column of another sheet
    Sheet(&'a str),
}

/// Operations the generation engine needs from a workbook encoding.
///
/// Implementations own sheet storage; callers address sheets through the
/// [`SheetId`] returned by [`create_sheet`](Self::create_sheet) and rows
/// through the [`RowId`] returned by [`append_row`](Self::append_row).
/// A `SheetId` outside the created range is a
/// [`SheetNotFound`](sheetcast_core::SheetcastError::SheetNotFound) error;
/// any rejection by the underlying encoding (duplicate or invalid sheet
/// name, range limits) surfaces as
/// [`Backend`](sheetcast_core::SheetcastError::Backend).
pub trait WorkbookBackend {
    /// Create a new sheet with the given name.
    fn create_sheet(&mut self, name: &str) -> Result<SheetId>;

    /// Append an empty row to a sheet.
    fn append_row(&mut self, sheet: SheetId) -> Result<RowId>;

    /// Append one cell to a row, with an optional number format.
    fn append_cell(
        &mut self,
        sheet: SheetId,
        row: RowId,
        value: &CellValue,
        format: Option<&str>,
    ) -> Result<()>;

    /// Set the width of one column.
    fn set_column_width(&mut self, sheet: SheetId, col: u16, width: f64) -> Result<()>;

    /// Apply an autofilter over a rectangular range.
    fn set_auto_filter(&mut self, sheet: SheetId, range: CellRange) -> Result<()>;

    /// Apply a freeze pane to a sheet.
    fn set_freeze_pane(&mut self, sheet: SheetId, pane: FreezePane) -> Result<()>;

    /// Mark a sheet hidden or visible.
    fn set_hidden(&mut self, sheet: SheetId, hidden: bool) -> Result<()>;

    /// Attach a list validation to one column over a row span.
    fn add_list_validation(
        &mut self,
        sheet: SheetId,
        rows: RowRange,
        col: u16,
        source: ListSource<'_>,
    ) -> Result<()>;
}
