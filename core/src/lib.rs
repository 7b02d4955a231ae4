//! # Sheetcast Core
//!
//! Core types for converting collections of structured records into tabular
//! spreadsheet sheets.
//!
//! This crate provides the building blocks the generation engine in
//! `sheetcast-service` is written against: the [`Record`](types::Record)
//! traversal capability, the [`CellValue`](types::CellValue) scalar model,
//! per-field column annotations, and the shared error type.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for sheetcast operations
pub mod error;

/// Per-field column annotations and dropdown directives
pub mod options;

/// Record traversal model and cell values
pub mod types;

// Re-export commonly used types
pub use error::{Result, SheetcastError};
pub use options::{ColumnOptions, DropdownSheet, DropdownSpec, DropdownValueTable};
pub use types::{CellValue, Field, FieldValue, Record, excel_serial};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, SheetcastError};
    pub use crate::options::*;
    pub use crate::types::*;
}
