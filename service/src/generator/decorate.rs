//! Sheet decoration: autofilter, freeze panes, hidden flag, and dropdown
//! validations, applied once per collection after all rows are written.

use super::cast;
use super::plan::{ColumnDescriptor, SheetPlan};
use crate::backend::{CellRange, FreezePane, ListSource, RowRange, SheetId, WorkbookBackend};
use sheetcast_core::{DropdownSheet, DropdownSpec, Result};
use tracing::warn;

/// Per-call decoration options.
#[derive(Debug, Clone, Default)]
pub struct DecorateOptions {
    /// Overrides the source sheet of every dropdown that resolves to an
    /// external reference. Takes precedence over both the `auto` sentinel
    /// and an explicitly annotated sheet name.
    pub dropdown_sheet: Option<String>,
}

/// Apply a finalized plan's decorations: autofilter, freeze pane, hidden
/// flag, then list validations, in that order.
pub(crate) fn decorate_sheet<B: WorkbookBackend + ?Sized>(
    backend: &mut B,
    sheet: SheetId,
    plan: &SheetPlan,
    options: &DecorateOptions,
) -> Result<()> {
    if plan.auto_filter && !plan.columns.is_empty() {
        let last_col = cast::column_index(plan.columns.len() - 1)?;
        let last_row = cast::row_index(plan.row_count)?;
        backend.set_auto_filter(
            sheet,
            CellRange {
                first_row: 0,
                first_col: 0,
                last_row,
                last_col,
            },
        )?;
    }

    match plan.freeze {
        FreezePane::None => {}
        pane => backend.set_freeze_pane(sheet, pane)?,
    }

    if plan.hidden {
        backend.set_hidden(sheet, true)?;
    }

    for column in &plan.columns {
        let Some(dropdown) = &column.dropdown else {
            continue;
        };
        if dropdown.row_count == 0 {
            continue;
        }

        let col = cast::column_index(column.index)?;
        let rows = RowRange {
            first: 1,
            last: dropdown.row_count,
        };

        if !dropdown.inline_values.is_empty() {
            backend.add_list_validation(
                sheet,
                rows,
                col,
                ListSource::Inline(&dropdown.inline_values),
            )?;
        } else if let Some(source) = resolve_dropdown_sheet(dropdown, column, options) {
            backend.add_list_validation(sheet, rows, col, ListSource::Sheet(&source))?;
        } else {
            warn!(
                sheet = %plan.name,
                column = %column.display_name,
                "dropdown directive has neither inline values nor a source sheet"
            );
        }
    }

    Ok(())
}

/// Resolve the external source sheet of one dropdown. The decoration-time
/// override is strictly higher priority; `auto` derives from the column's
/// display name.
fn resolve_dropdown_sheet(
    dropdown: &DropdownSpec,
    column: &ColumnDescriptor,
    options: &DecorateOptions,
) -> Option<String> {
    if let Some(name) = &options.dropdown_sheet {
        return Some(name.clone());
    }
    match &dropdown.sheet {
        Some(DropdownSheet::Named(name)) => Some(name.clone()),
        Some(DropdownSheet::Auto) => Some(column.display_name.clone()),
        None => None,
    }
}
