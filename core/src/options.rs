//! Per-field column annotations
//!
//! Every tabulated field carries an annotation string that controls how its
//! column renders:
//!
//! ```text
//! displayName[,format:<fmt>][,width:<float>][,dropdown:<rowCount>][,dropdown-sheet:<name>|auto]
//! ```
//!
//! An empty annotation or the sentinel `-` omits the field entirely.
//! Unknown directive keys are ignored so newer annotations keep parsing on
//! older versions.

use crate::error::{Result, SheetcastError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lookup table from column display name to the literal values allowed in
/// that column's dropdown. Keys are case-sensitive.
pub type DropdownValueTable = IndexMap<String, Vec<String>>;

/// Sentinel accepted by the `dropdown-sheet` directive.
const DROPDOWN_SHEET_AUTO: &str = "auto";

/// Where a dropdown's allowed values come from when they are not inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropdownSheet {
    /// Derive the sheet name from the column display name at decoration
    /// time
    Auto,
    /// An explicitly named sheet
    Named(String),
}

/// List-validation directive attached to one column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DropdownSpec {
    /// Number of data rows below the header the validation covers
    pub row_count: u32,
    /// Literal allowed values; populated from the configured
    /// [`DropdownValueTable`] when it has an entry for the display name
    pub inline_values: Vec<String>,
    /// External sheet to reference when no inline values apply
    pub sheet: Option<DropdownSheet>,
}

impl DropdownSpec {
    /// Whether decoration has anything to attach for this spec.
    #[must_use]
    pub fn has_source(&self) -> bool {
        !self.inline_values.is_empty() || self.sheet.is_some()
    }
}

/// Parsed rendering directives for one column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnOptions {
    /// Header text, used verbatim
    pub column_name: String,
    /// Number format applied to the column's data cells
    pub format: Option<String>,
    /// Column width; applied only when positive
    pub width: Option<f64>,
    /// Omit this field from header and data rows
    pub skip: bool,
    /// List-validation directive
    pub dropdown: Option<DropdownSpec>,
}

impl ColumnOptions {
    /// Parse an annotation string.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Parse`] for a malformed numeric directive
    /// value, identifying the offending directive.
    pub fn parse(tag: &str) -> Result<Self> {
        if tag.is_empty() || tag == "-" {
            return Ok(Self::skipped());
        }

        let mut segments = tag.split(',');
        let mut options = Self {
            column_name: segments.next().unwrap_or_default().to_string(),
            ..Self::default()
        };

        for segment in segments {
            let Some((key, value)) = segment.split_once(':') else {
                continue;
            };

            match key {
                "format" => options.format = Some(value.to_string()),
                "width" => {
                    let width: f64 = value.parse().map_err(|_| {
                        SheetcastError::parse(segment, "invalid floating-point width")
                    })?;
                    options.width = Some(width);
                }
                "dropdown" => {
                    let rows: u32 = value.parse().map_err(|_| {
                        SheetcastError::parse(segment, "invalid dropdown row count")
                    })?;
                    options.dropdown.get_or_insert_with(DropdownSpec::default).row_count = rows;
                }
                "dropdown-sheet" => {
                    let sheet = if value == DROPDOWN_SHEET_AUTO {
                        DropdownSheet::Auto
                    } else {
                        DropdownSheet::Named(value.to_string())
                    };
                    options.dropdown.get_or_insert_with(DropdownSpec::default).sheet = Some(sheet);
                }
                _ => {}
            }
        }

        Ok(options)
    }

    /// Options for an unannotated field: present, with an empty header.
    #[must_use]
    pub fn untagged() -> Self {
        Self::default()
    }

    /// Options for a field omitted entirely. No other field of the result
    /// is meaningful.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    /// Populate inline dropdown values from the configured table when it
    /// has an entry for this column's display name.
    pub fn resolve_dropdown_values(&mut self, table: &DropdownValueTable) {
        if let Some(dropdown) = &mut self.dropdown
            && let Some(values) = table.get(&self.column_name)
        {
            dropdown.inline_values = values.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_name() {
        let options = ColumnOptions::parse("Some Name").expect("parses");
        assert_eq!(
            options,
            ColumnOptions {
                column_name: "Some Name".to_string(),
                ..ColumnOptions::default()
            }
        );
    }

    #[test]
    fn test_name_and_width() {
        let options = ColumnOptions::parse("Some Name,width:123.11").expect("parses");
        assert_eq!(options.column_name, "Some Name");
        assert_eq!(options.width, Some(123.11));
        assert_eq!(options.format, None);
    }

    #[test]
    fn test_invalid_width_is_parse_error() {
        let err = ColumnOptions::parse("Some Name,width:12o3.11").unwrap_err();
        match err {
            SheetcastError::Parse { directive, .. } => {
                assert_eq!(directive, "width:12o3.11");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_directive_order_does_not_matter() {
        let a = ColumnOptions::parse("Some Name,format:asd,width:123.11").expect("parses");
        let b = ColumnOptions::parse("Some Name,width:123.11,format:asd").expect("parses");
        assert_eq!(a, b);
        assert_eq!(a.format.as_deref(), Some("asd"));
        assert_eq!(a.width, Some(123.11));
    }

    #[test]
    fn test_numeric_format_stays_verbatim() {
        let options = ColumnOptions::parse("Some Name,format:123").expect("parses");
        assert_eq!(options.format.as_deref(), Some("123"));
    }

    #[test]
    fn test_skip_sentinels() {
        assert!(ColumnOptions::parse("").expect("parses").skip);
        assert!(ColumnOptions::parse("-").expect("parses").skip);
        assert!(!ColumnOptions::parse("name").expect("parses").skip);
    }

    #[test]
    fn test_dropdown_directives() {
        let options =
            ColumnOptions::parse("custom_dropdown,dropdown:12").expect("parses");
        let dropdown = options.dropdown.expect("dropdown spec");
        assert_eq!(dropdown.row_count, 12);
        assert!(dropdown.inline_values.is_empty());
        assert_eq!(dropdown.sheet, None);

        let options =
            ColumnOptions::parse("status,dropdown:4,dropdown-sheet:auto").expect("parses");
        let dropdown = options.dropdown.expect("dropdown spec");
        assert_eq!(dropdown.sheet, Some(DropdownSheet::Auto));

        let options =
            ColumnOptions::parse("status,dropdown:4,dropdown-sheet:Lookups").expect("parses");
        let dropdown = options.dropdown.expect("dropdown spec");
        assert_eq!(dropdown.sheet, Some(DropdownSheet::Named("Lookups".to_string())));
    }

    #[test]
    fn test_invalid_dropdown_count_is_parse_error() {
        let err = ColumnOptions::parse("status,dropdown:many").unwrap_err();
        assert!(matches!(err, SheetcastError::Parse { .. }));
    }

    #[test]
    fn test_unknown_directives_are_ignored() {
        let options =
            ColumnOptions::parse("Some Name,color:red,width:10").expect("parses");
        assert_eq!(options.width, Some(10.0));
    }

    #[test]
    fn test_resolve_dropdown_values() {
        let mut table = DropdownValueTable::new();
        table.insert(
            "custom_dropdown".to_string(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        );

        let mut options =
            ColumnOptions::parse("custom_dropdown,dropdown:12").expect("parses");
        options.resolve_dropdown_values(&table);
        let dropdown = options.dropdown.expect("dropdown spec");
        assert_eq!(dropdown.inline_values, vec!["a", "b", "c"]);

        // Lookup is case-sensitive and keyed by display name.
        let mut options = ColumnOptions::parse("Custom_Dropdown,dropdown:12").expect("parses");
        options.resolve_dropdown_values(&table);
        assert!(options.dropdown.expect("dropdown spec").inline_values.is_empty());
    }
}
