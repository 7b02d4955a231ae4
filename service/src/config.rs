//! Generator configuration.

use crate::backend::FreezePane;
use bitflags::bitflags;
use indexmap::IndexSet;
use sheetcast_core::DropdownValueTable;

bitflags! {
    /// Sheet decoration features to enable.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SheetFeatures: u8 {
        /// Apply an autofilter over the generated table
        const AUTO_FILTER = 0b0001;
        /// Keep the header row visible while scrolling
        const FREEZE_FIRST_ROW = 0b0010;
        /// Keep the first column visible while scrolling
        const FREEZE_FIRST_COLUMN = 0b0100;

        /// No features (plain sheets, the default)
        const NONE = 0b0000;
    }
}

/// Configuration for one generation run.
///
/// Built with `with_*` methods:
///
/// ```
/// use sheetcast_service::config::GeneratorConfig;
///
/// let config = GeneratorConfig::new()
///     .with_auto_filter(true)
///     .with_frozen_first_row(true)
///     .with_hidden_sheet("Lookups")
///     .with_dropdown_values("status", ["active", "inactive"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Enabled decoration features
    features: SheetFeatures,
    /// Names of sheets to flag hidden
    hidden_sheets: IndexSet<String>,
    /// Column display name to allowed dropdown values
    dropdown_values: DropdownValueTable,
}

impl GeneratorConfig {
    /// Create a configuration with no features enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the autofilter feature.
    #[must_use]
    pub fn with_auto_filter(mut self, enabled: bool) -> Self {
        self.features.set(SheetFeatures::AUTO_FILTER, enabled);
        self
    }

    /// Configure first-row freezing.
    #[must_use]
    pub fn with_frozen_first_row(mut self, enabled: bool) -> Self {
        self.features.set(SheetFeatures::FREEZE_FIRST_ROW, enabled);
        self
    }

    /// Configure first-column freezing. Takes precedence over first-row
    /// freezing when both are requested.
    #[must_use]
    pub fn with_frozen_first_column(mut self, enabled: bool) -> Self {
        self.features.set(SheetFeatures::FREEZE_FIRST_COLUMN, enabled);
        self
    }

    /// Flag one sheet name as hidden.
    #[must_use]
    pub fn with_hidden_sheet(mut self, name: impl Into<String>) -> Self {
        self.hidden_sheets.insert(name.into());
        self
    }

    /// Flag several sheet names as hidden.
    #[must_use]
    pub fn with_hidden_sheets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_sheets.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register the literal allowed values for one column display name.
    /// Columns carrying a `dropdown` directive whose display name matches
    /// (case-sensitively) get these as an inline list validation.
    #[must_use]
    pub fn with_dropdown_values<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropdown_values
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the autofilter feature is enabled.
    #[must_use]
    pub fn auto_filter(&self) -> bool {
        self.features.contains(SheetFeatures::AUTO_FILTER)
    }

    /// The effective freeze pane. First-column freeze wins when both
    /// freeze features are enabled.
    #[must_use]
    pub fn freeze_pane(&self) -> FreezePane {
        if self.features.contains(SheetFeatures::FREEZE_FIRST_COLUMN) {
            FreezePane::FirstColumn
        } else if self.features.contains(SheetFeatures::FREEZE_FIRST_ROW) {
            FreezePane::FirstRow
        } else {
            FreezePane::None
        }
    }

    /// Whether a sheet name is configured hidden.
    #[must_use]
    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden_sheets.contains(name)
    }

    /// The configured dropdown value table.
    #[must_use]
    pub fn dropdown_values(&self) -> &DropdownValueTable {
        &self.dropdown_values
    }
}
