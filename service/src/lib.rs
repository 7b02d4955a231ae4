//! # Sheetcast Service
//!
//! Converts named collections of structured records into tabular
//! spreadsheet sheets: one sheet per collection, one row per record, one
//! column per leaf field, recursively flattened through nested records,
//! optional references, and dynamic map-typed fields.
//!
//! Record types describe themselves through the
//! [`Record`](sheetcast_core::Record) trait and annotate each field with a
//! column directive string:
//!
//! ```text
//! displayName[,format:<fmt>][,width:<float>][,dropdown:<rows>][,dropdown-sheet:<name>|auto]
//! ```
//!
//! ## Example
//!
//! ```
//! use sheetcast_core::{Field, Record};
//! use sheetcast_service::{GeneratorConfig, SheetSet, write_workbook};
//!
//! struct Measurement {
//!     id: i64,
//!     value: f64,
//! }
//!
//! impl Record for Measurement {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::leaf("id", "id", self.id),
//!             Field::leaf("value", "value,format:0.000000000000,width:25", self.value),
//!         ]
//!     }
//! }
//!
//! let measurements = vec![Measurement { id: 1, value: 2.2 }];
//! let mut sheets = SheetSet::new();
//! sheets.insert("sheet1", &measurements);
//!
//! let mut buffer = Vec::new();
//! write_workbook(&sheets, &mut buffer, GeneratorConfig::new()).expect("generates");
//! assert!(!buffer.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Workbook backends: the trait and the XLSX and in-memory bindings
pub mod backend;

/// Generator configuration
pub mod config;

/// The generation engine: flattening, materialization, decoration
pub mod generator;

/// Ordered, named record collections
pub mod sheet_set;

// Re-export commonly used types
pub use backend::{MemoryBackend, WorkbookBackend, XlsxBackend};
pub use config::{GeneratorConfig, SheetFeatures};
pub use generator::{DecorateOptions, Generator, SheetPlan};
pub use sheet_set::{RecordSlice, SheetSet};
pub use sheetcast_core::{CellValue, Field, FieldValue, Record, Result, SheetcastError};

use std::io::Write;

/// Generate one XLSX workbook from a set of named collections and write it
/// to `out`.
///
/// # Errors
///
/// Returns the first error raised by any collection; on error no usable
/// workbook is written.
pub fn write_workbook<W: Write>(
    set: &SheetSet<'_>,
    out: &mut W,
    config: GeneratorConfig,
) -> Result<()> {
    let generator = Generator::with_config(XlsxBackend::new(), config);
    generator.generate(set)?;
    generator.save_to_writer(out)
}
