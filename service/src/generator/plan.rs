//! Schema flattening: from a record's field tree to an ordered column plan.
//!
//! The plan is derived once per collection, from its first record, because
//! dynamic (map-typed) fields need instance data to enumerate their keys.
//! Every later record is materialized against the fixed plan (`rows`
//! module), so the two sides traverse through the same [`FieldPath`]s by
//! construction.

use crate::backend::FreezePane;
use serde::Serialize;
use sheetcast_core::{
    ColumnOptions, DropdownSpec, DropdownValueTable, Field, FieldValue, Record, Result,
};
use std::fmt;
use tracing::debug;

/// One traversal step from a record to a leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathStep {
    /// Read a declared field by name
    Field(&'static str),
    /// Read a dynamic-field entry by key
    Key(String),
}

/// Ordered traversal steps addressing one leaf value of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldPath(Vec<PathStep>);

impl FieldPath {
    /// The empty path, addressing the record itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// This path extended by one step.
    #[must_use]
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// The traversal steps, outermost first.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// The name of the field this path terminates in.
    #[must_use]
    pub fn leaf_name(&self) -> &str {
        self.0
            .iter()
            .rev()
            .find_map(|step| match step {
                PathStep::Field(name) => Some(*name),
                PathStep::Key(_) => None,
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathStep::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

/// One planned column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// 0-based column index; densely assigned, skipped fields excluded
    pub index: usize,
    /// Header text, used verbatim
    pub display_name: String,
    /// Number format for the column's data cells
    pub format: Option<String>,
    /// Column width; applied only when positive
    pub width: Option<f64>,
    /// List-validation directive
    pub dropdown: Option<DropdownSpec>,
    /// How to read this column's value from a record
    pub path: FieldPath,
}

/// The column plan of one collection. Columns and dynamic fields are fixed
/// by [`flatten`](Self::flatten); the row count and decoration flags are
/// finalized exactly once, after all rows are written, before the sheet is
/// decorated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SheetPlan {
    /// Sheet (collection) name
    pub name: String,
    /// Planned columns, in emission order
    pub columns: Vec<ColumnDescriptor>,
    /// Paths of the dynamic fields that contributed columns
    pub dynamic_fields: Vec<FieldPath>,
    /// Number of data rows written
    pub row_count: usize,
    /// Apply an autofilter over the generated table
    pub auto_filter: bool,
    /// Freeze pane to apply
    pub freeze: FreezePane,
    /// Flag the sheet hidden
    pub hidden: bool,
}

impl SheetPlan {
    /// Derive the column plan for a collection from its first record.
    ///
    /// Traversal is depth-first in field declaration order. Nested
    /// aggregates are spliced in at the embedding point; absent optional
    /// aggregates contribute zero columns; dynamic fields emit one column
    /// per key in sorted order, every key sharing the field's annotation.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::Parse`](sheetcast_core::SheetcastError::Parse)
    /// for a malformed annotation anywhere in the record; no partial plan
    /// is produced.
    pub fn flatten(
        name: impl Into<String>,
        first: &dyn Record,
        dropdown_values: &DropdownValueTable,
    ) -> Result<Self> {
        let mut plan = Self {
            name: name.into(),
            ..Self::default()
        };
        plan.flatten_fields(&FieldPath::root(), &first.fields(), dropdown_values)?;
        debug!(
            sheet = %plan.name,
            columns = plan.columns.len(),
            dynamic_fields = plan.dynamic_fields.len(),
            "derived column plan"
        );
        Ok(plan)
    }

    fn flatten_fields(
        &mut self,
        base: &FieldPath,
        fields: &[Field<'_>],
        dropdown_values: &DropdownValueTable,
    ) -> Result<()> {
        for field in fields {
            match &field.value {
                FieldValue::Nested(Some(record)) => {
                    let path = base.child(PathStep::Field(field.name));
                    self.flatten_fields(&path, &record.fields(), dropdown_values)?;
                }
                // Absent optional aggregate: nothing to plan against.
                FieldValue::Nested(None) => {}
                FieldValue::Dynamic(entries) => {
                    let options = field_options(field, dropdown_values)?;
                    if options.skip {
                        continue;
                    }
                    let Some(entries) = entries else {
                        continue;
                    };

                    let path = base.child(PathStep::Field(field.name));
                    self.dynamic_fields.push(path.clone());

                    let mut keys: Vec<&String> = entries.iter().map(|(key, _)| key).collect();
                    keys.sort();
                    for key in keys {
                        let mut options = options.clone();
                        options.column_name = key.clone();
                        options.resolve_dropdown_values(dropdown_values);
                        self.push_column(options, path.child(PathStep::Key(key.clone())));
                    }
                }
                FieldValue::Leaf(_) => {
                    let options = field_options(field, dropdown_values)?;
                    if options.skip {
                        continue;
                    }
                    self.push_column(options, base.child(PathStep::Field(field.name)));
                }
            }
        }
        Ok(())
    }

    fn push_column(&mut self, options: ColumnOptions, path: FieldPath) {
        self.columns.push(ColumnDescriptor {
            index: self.columns.len(),
            display_name: options.column_name,
            format: options.format,
            width: options.width,
            dropdown: options.dropdown,
            path,
        });
    }
}

fn field_options(field: &Field<'_>, dropdown_values: &DropdownValueTable) -> Result<ColumnOptions> {
    let mut options = match field.tag {
        None => ColumnOptions::untagged(),
        Some(tag) => ColumnOptions::parse(tag)?,
    };
    options.resolve_dropdown_values(dropdown_values);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetcast_core::{CellValue, DropdownValueTable};

    struct Inner {
        id: i64,
        note: Option<String>,
    }

    impl Record for Inner {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::leaf("id", "id", self.id),
                Field::leaf("note", "note", self.note.clone()),
            ]
        }
    }

    struct Outer {
        label: String,
        inner: Inner,
        hidden: bool,
        extra: Option<Inner>,
    }

    impl Record for Outer {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::leaf("label", "label,width:25", self.label.clone()),
                Field::nested("inner", &self.inner),
                Field::leaf("hidden", "-", self.hidden),
                Field::nested_opt("extra", self.extra.as_ref().map(|r| r as &dyn Record)),
            ]
        }
    }

    fn outer() -> Outer {
        Outer {
            label: "a".to_string(),
            inner: Inner {
                id: 1,
                note: None,
            },
            hidden: true,
            extra: None,
        }
    }

    #[test]
    fn test_nested_fields_splice_in_declaration_order() -> Result<()> {
        let plan = SheetPlan::flatten("sheet", &outer(), &DropdownValueTable::new())?;

        let names: Vec<&str> = plan.columns.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["label", "id", "note"]);
        let indices: Vec<usize> = plan.columns.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        assert_eq!(plan.columns[1].path.to_string(), "inner.id");
        assert_eq!(plan.columns[1].path.leaf_name(), "id");
        Ok(())
    }

    #[test]
    fn test_skipped_field_consumes_no_index() -> Result<()> {
        let plan = SheetPlan::flatten("sheet", &outer(), &DropdownValueTable::new())?;
        assert!(plan.columns.iter().all(|c| c.display_name != "hidden"));
        assert_eq!(plan.columns.len(), 3);
        Ok(())
    }

    #[test]
    fn test_flattening_is_idempotent() -> Result<()> {
        let record = outer();
        let first = SheetPlan::flatten("sheet", &record, &DropdownValueTable::new())?;
        let second = SheetPlan::flatten("sheet", &record, &DropdownValueTable::new())?;
        assert_eq!(first, second);
        Ok(())
    }

    struct WithMap {
        id: i64,
        attributes: Vec<(String, CellValue)>,
    }

    impl Record for WithMap {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::leaf("id", "id", self.id),
                Field::dynamic("attributes", "attrs,width:10", self.attributes.clone()),
            ]
        }
    }

    #[test]
    fn test_dynamic_field_emits_sorted_key_columns() -> Result<()> {
        let record = WithMap {
            id: 1,
            attributes: vec![
                ("b".to_string(), CellValue::Int(2)),
                ("a".to_string(), CellValue::Int(1)),
            ],
        };
        let plan = SheetPlan::flatten("sheet", &record, &DropdownValueTable::new())?;

        let names: Vec<&str> = plan.columns.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["id", "a", "b"]);
        // Every key column inherits the shared field annotation.
        assert_eq!(plan.columns[1].width, Some(10.0));
        assert_eq!(plan.columns[2].width, Some(10.0));
        assert_eq!(plan.dynamic_fields.len(), 1);
        assert_eq!(plan.dynamic_fields[0].to_string(), "attributes");
        assert_eq!(plan.columns[2].path.to_string(), "attributes[b]");
        Ok(())
    }

    #[test]
    fn test_malformed_annotation_aborts_flattening() {
        struct Bad;
        impl Record for Bad {
            fn fields(&self) -> Vec<Field<'_>> {
                vec![Field::leaf("w", "w,width:12o3", 1)]
            }
        }
        let err = SheetPlan::flatten("sheet", &Bad, &DropdownValueTable::new()).unwrap_err();
        assert!(matches!(
            err,
            sheetcast_core::SheetcastError::Parse { .. }
        ));
    }

    #[test]
    fn test_unannotated_field_gets_empty_header() -> Result<()> {
        struct Plain {
            value: i64,
        }
        impl Record for Plain {
            fn fields(&self) -> Vec<Field<'_>> {
                vec![Field::unannotated("value", self.value)]
            }
        }
        let plan = SheetPlan::flatten("sheet", &Plain { value: 3 }, &DropdownValueTable::new())?;
        assert_eq!(plan.columns.len(), 1);
        assert_eq!(plan.columns[0].display_name, "");
        Ok(())
    }
}
