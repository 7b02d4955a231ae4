//! The sheet generation engine.
//!
//! One [`Generator`] drives one workbook. For each named collection the
//! engine derives the column plan from the first record ([`plan`]), writes
//! the header row, materializes every record against the fixed plan
//! ([`rows`]), validates dynamic-field key consistency ([`mapkeys`]), and
//! finally decorates the sheet ([`decorate`]).

mod cast;
pub mod decorate;
pub mod mapkeys;
pub mod plan;
pub mod rows;

pub use decorate::DecorateOptions;
pub use mapkeys::MapKeyTracker;
pub use plan::{ColumnDescriptor, FieldPath, PathStep, SheetPlan};
pub use rows::materialize;

use crate::backend::{SheetId, WorkbookBackend, XlsxBackend};
use crate::config::GeneratorConfig;
use crate::sheet_set::{RecordSlice, SheetSet};
use parking_lot::Mutex;
use sheetcast_core::{CellValue, Result, SheetcastError};
use std::io::Write;
use std::path::Path;
use tracing::debug;

struct SheetInfo {
    id: SheetId,
    name: String,
}

struct State<B> {
    backend: B,
    sheets: Vec<SheetInfo>,
}

/// Drives the generation of one workbook over a [`WorkbookBackend`].
///
/// Sheets may be created and filled from multiple threads; the sheet list
/// and the backend sit behind a single workbook-scoped mutex, and all work
/// for one collection runs synchronously on the calling thread.
pub struct Generator<B: WorkbookBackend> {
    config: GeneratorConfig,
    state: Mutex<State<B>>,
}

impl<B: WorkbookBackend> Generator<B> {
    /// Create a generator with default (plain) configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, GeneratorConfig::default())
    }

    /// Create a generator with the given configuration.
    #[must_use]
    pub fn with_config(backend: B, config: GeneratorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                backend,
                sheets: Vec::new(),
            }),
        }
    }

    /// The generator's configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Create a new sheet, returning its 0-based sheet number.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] when the backend rejects the
    /// name (duplicate or invalid).
    pub fn add_sheet(&self, name: &str) -> Result<usize> {
        let mut state = self.state.lock();
        let id = state.backend.create_sheet(name)?;
        state.sheets.push(SheetInfo {
            id,
            name: name.to_string(),
        });
        debug!(sheet = name, "created sheet");
        Ok(state.sheets.len() - 1)
    }

    /// Tabulate a collection of records into an existing sheet.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::SheetNotFound`] for an out-of-range sheet
    /// number, [`SheetcastError::InputShape`] for an empty collection, and
    /// any flattening, materialization, consistency, or backend error. An
    /// error aborts the collection; rows already appended are not rolled
    /// back and the workbook must be discarded.
    pub fn add_data<S>(&self, sheet_no: usize, records: &S) -> Result<()>
    where
        S: RecordSlice + ?Sized,
    {
        self.add_data_with(sheet_no, records, &DecorateOptions::default())
    }

    /// [`add_data`](Self::add_data) with per-call decoration options.
    ///
    /// # Errors
    ///
    /// See [`add_data`](Self::add_data).
    pub fn add_data_with<S>(
        &self,
        sheet_no: usize,
        records: &S,
        options: &DecorateOptions,
    ) -> Result<()>
    where
        S: RecordSlice + ?Sized,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let count = state.sheets.len();
        let info = state
            .sheets
            .get(sheet_no)
            .ok_or_else(|| SheetcastError::sheet_not_found(sheet_no, count))?;
        let sheet_id = info.id;
        let sheet_name = info.name.clone();

        if records.is_empty() {
            return Err(SheetcastError::input_shape_for(
                "provided collection is empty",
                sheet_name,
            ));
        }

        let mut plan = SheetPlan::flatten(
            sheet_name.clone(),
            records.record(0),
            self.config.dropdown_values(),
        )?;

        let header = state.backend.append_row(sheet_id)?;
        for column in &plan.columns {
            state.backend.append_cell(
                sheet_id,
                header,
                &CellValue::Text(column.display_name.clone()),
                None,
            )?;
            if let Some(width) = column.width
                && width > 0.0
            {
                state
                    .backend
                    .set_column_width(sheet_id, cast::column_index(column.index)?, width)?;
            }
        }

        let mut tracker = MapKeyTracker::new(&plan.dynamic_fields);
        for i in 0..records.len() {
            let record = records.record(i);
            let cells = materialize(&plan, record)?;
            let row = state.backend.append_row(sheet_id)?;
            for (column, value) in plan.columns.iter().zip(&cells) {
                state
                    .backend
                    .append_cell(sheet_id, row, value, column.format.as_deref())?;
            }
            tracker.observe(record)?;
        }
        plan.row_count = records.len();
        plan.auto_filter = self.config.auto_filter();
        plan.freeze = self.config.freeze_pane();
        plan.hidden = self.config.is_hidden(&sheet_name);

        tracker.finish()?;
        decorate::decorate_sheet(&mut state.backend, sheet_id, &plan, options)?;

        debug!(
            sheet = %sheet_name,
            columns = plan.columns.len(),
            rows = plan.row_count,
            "sheet generated"
        );
        Ok(())
    }

    /// Generate one sheet per collection of the set, in set order.
    ///
    /// # Errors
    ///
    /// The first failing collection aborts generation; sheets generated
    /// before it are unaffected, but the workbook as a whole must be
    /// discarded on error.
    pub fn generate(&self, set: &SheetSet<'_>) -> Result<()> {
        for (name, records) in set.iter() {
            let sheet_no = self.add_sheet(name)?;
            self.add_data(sheet_no, records)?;
        }
        Ok(())
    }

    /// Consume the generator and return the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.state.into_inner().backend
    }
}

impl Generator<XlsxBackend> {
    /// Serialize the generated workbook to an in-memory XLSX buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if serialization fails.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        self.state.lock().backend.save_to_buffer()
    }

    /// Serialize the generated workbook and write it to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if serialization or the write
    /// fails.
    pub fn save_to_writer<W: Write>(&self, out: &mut W) -> Result<()> {
        self.state.lock().backend.save_to_writer(out)
    }

    /// Serialize the generated workbook to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Backend`] if serialization or the file
    /// write fails.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.state.lock().backend.save_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use sheetcast_core::Field;

    struct Item {
        id: i64,
    }

    impl sheetcast_core::Record for Item {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::leaf("id", "id", self.id)]
        }
    }

    #[test]
    fn test_add_data_to_missing_sheet_fails() {
        let generator = Generator::new(MemoryBackend::new());
        let err = generator.add_data(0, &[Item { id: 1 }][..]).unwrap_err();
        assert!(matches!(
            err,
            SheetcastError::SheetNotFound { index: 0, count: 0 }
        ));
    }

    #[test]
    fn test_empty_collection_fails() -> Result<()> {
        let generator = Generator::new(MemoryBackend::new());
        let sheet_no = generator.add_sheet("items")?;
        let empty: &[Item] = &[];
        let err = generator.add_data(sheet_no, empty).unwrap_err();
        assert!(matches!(err, SheetcastError::InputShape { .. }));
        Ok(())
    }

    #[test]
    fn test_sheet_numbers_are_dense() -> Result<()> {
        let generator = Generator::new(MemoryBackend::new());
        assert_eq!(generator.add_sheet("one")?, 0);
        assert_eq!(generator.add_sheet("two")?, 1);
        assert_eq!(generator.add_sheet("three")?, 2);
        Ok(())
    }
}
