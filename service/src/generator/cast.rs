//! Index casts bounded by worksheet limits.

use sheetcast_core::{Result, SheetcastError};

/// A worksheet holds at most 16,384 columns (2^14).
const MAX_COLUMNS: usize = 16_384;

/// A worksheet holds at most 1,048,576 rows (2^20).
const MAX_ROWS: usize = 1_048_576;

/// Cast a 0-based column index to the backend's column type.
///
/// # Errors
///
/// Returns [`SheetcastError::Backend`] when the index exceeds the
/// worksheet column limit.
pub fn column_index(value: usize) -> Result<u16> {
    if value >= MAX_COLUMNS {
        return Err(SheetcastError::backend(format!(
            "too many columns for a worksheet: {value} (max {MAX_COLUMNS})"
        )));
    }
    u16::try_from(value)
        .map_err(|_| SheetcastError::backend(format!("column index {value} cannot fit in u16")))
}

/// Cast a 0-based row index to the backend's row type.
///
/// # Errors
///
/// Returns [`SheetcastError::Backend`] when the index exceeds the
/// worksheet row limit.
pub fn row_index(value: usize) -> Result<u32> {
    if value >= MAX_ROWS {
        return Err(SheetcastError::backend(format!(
            "too many rows for a worksheet: {value} (max {MAX_ROWS})"
        )));
    }
    u32::try_from(value)
        .map_err(|_| SheetcastError::backend(format!("row index {value} cannot fit in u32")))
}
