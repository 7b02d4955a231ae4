//! Row materialization: one cell per planned column, per record.
//!
//! Instead of re-running the flattening traversal, every column's
//! [`FieldPath`] is resolved against the record, so a plan/walk disagreement
//! is impossible by construction. Dynamic-field values are paired by key
//! name, never by position.

use super::plan::{FieldPath, PathStep, SheetPlan};
use sheetcast_core::{CellValue, FieldValue, Record, Result, SheetcastError};

/// Produce the ordered cell values of one record under a fixed plan.
///
/// Absent optionals at any depth yield [`CellValue::Empty`] for every
/// column they would have contributed. A map key missing from this record
/// also yields an empty cell; the map-key consistency validator rejects
/// the collection afterwards.
///
/// # Errors
///
/// Returns [`SheetcastError::SchemaMismatch`] when the record's shape
/// diverges from the plan (a field is missing, or a leaf sits where the
/// plan expects an aggregate and vice versa).
pub fn materialize(plan: &SheetPlan, record: &dyn Record) -> Result<Vec<CellValue>> {
    plan.columns
        .iter()
        .map(|column| resolve(record, &column.path))
        .collect()
}

/// Resolve one leaf value by path.
pub(crate) fn resolve(record: &dyn Record, path: &FieldPath) -> Result<CellValue> {
    resolve_steps(record, path.steps(), path)
}

fn resolve_steps(record: &dyn Record, steps: &[PathStep], path: &FieldPath) -> Result<CellValue> {
    let Some((step, rest)) = steps.split_first() else {
        return Err(mismatch(path, "path terminates on an aggregate"));
    };
    let PathStep::Field(name) = step else {
        return Err(mismatch(path, "key step applied to a record"));
    };

    let fields = record.fields();
    let Some(field) = fields.iter().find(|f| f.name == *name) else {
        return Err(mismatch(path, format!("field '{name}' missing from record")));
    };

    match &field.value {
        FieldValue::Leaf(value) => {
            if rest.is_empty() {
                Ok(value.clone())
            } else {
                Err(mismatch(path, format!("field '{name}' is a leaf, expected an aggregate")))
            }
        }
        FieldValue::Nested(Some(inner)) => {
            if rest.is_empty() {
                Err(mismatch(path, format!("field '{name}' is an aggregate, expected a leaf")))
            } else {
                resolve_steps(*inner, rest, path)
            }
        }
        FieldValue::Nested(None) => Ok(CellValue::Empty),
        FieldValue::Dynamic(Some(entries)) => match rest {
            [PathStep::Key(key)] => Ok(entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, value)| value.clone())
                .unwrap_or(CellValue::Empty)),
            _ => Err(mismatch(path, format!("field '{name}' is map-typed, expected a key step"))),
        },
        FieldValue::Dynamic(None) => Ok(CellValue::Empty),
    }
}

fn mismatch(path: &FieldPath, message: impl Into<String>) -> SheetcastError {
    SheetcastError::schema_mismatch(path.to_string(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetcast_core::{DropdownValueTable, Field};

    struct Address {
        city: String,
        zip: String,
    }

    impl Record for Address {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::leaf("city", "city", self.city.clone()),
                Field::leaf("zip", "zip", self.zip.clone()),
            ]
        }
    }

    struct Person {
        name: String,
        address: Option<Address>,
    }

    impl Record for Person {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::leaf("name", "name", self.name.clone()),
                Field::nested_opt("address", self.address.as_ref().map(|r| r as &dyn Record)),
            ]
        }
    }

    #[test]
    fn test_absent_optional_yields_one_empty_cell_per_column() -> Result<()> {
        let planned = Person {
            name: "ada".to_string(),
            address: Some(Address {
                city: "london".to_string(),
                zip: "n1".to_string(),
            }),
        };
        let plan = SheetPlan::flatten("people", &planned, &DropdownValueTable::new())?;
        assert_eq!(plan.columns.len(), 3);

        let absent = Person {
            name: "bob".to_string(),
            address: None,
        };
        let cells = materialize(&plan, &absent)?;
        assert_eq!(
            cells,
            vec![
                CellValue::Text("bob".to_string()),
                CellValue::Empty,
                CellValue::Empty,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_every_row_has_exactly_plan_columns() -> Result<()> {
        let planned = Person {
            name: "ada".to_string(),
            address: Some(Address {
                city: "london".to_string(),
                zip: "n1".to_string(),
            }),
        };
        let plan = SheetPlan::flatten("people", &planned, &DropdownValueTable::new())?;
        let cells = materialize(&plan, &planned)?;
        assert_eq!(cells.len(), plan.columns.len());
        Ok(())
    }

    #[test]
    fn test_dynamic_values_pair_by_key_name_not_position() -> Result<()> {
        struct Row {
            attrs: Vec<(String, CellValue)>,
        }
        impl Record for Row {
            fn fields(&self) -> Vec<Field<'_>> {
                vec![Field::dynamic("attrs", "attrs", self.attrs.clone())]
            }
        }

        let first = Row {
            attrs: vec![
                ("a".to_string(), CellValue::Int(1)),
                ("b".to_string(), CellValue::Int(2)),
            ],
        };
        let plan = SheetPlan::flatten("rows", &first, &DropdownValueTable::new())?;

        // Same keys, reversed insertion order: values still land under the
        // right headers.
        let second = Row {
            attrs: vec![
                ("b".to_string(), CellValue::Int(20)),
                ("a".to_string(), CellValue::Int(10)),
            ],
        };
        let cells = materialize(&plan, &second)?;
        assert_eq!(cells, vec![CellValue::Int(10), CellValue::Int(20)]);
        Ok(())
    }

    #[test]
    fn test_shape_divergence_is_schema_mismatch() -> Result<()> {
        struct Flat {
            name: String,
            address: String,
        }
        impl Record for Flat {
            fn fields(&self) -> Vec<Field<'_>> {
                vec![
                    Field::leaf("name", "name", self.name.clone()),
                    Field::leaf("address", "address", self.address.clone()),
                ]
            }
        }

        let planned = Person {
            name: "ada".to_string(),
            address: Some(Address {
                city: "london".to_string(),
                zip: "n1".to_string(),
            }),
        };
        let plan = SheetPlan::flatten("people", &planned, &DropdownValueTable::new())?;

        // `address` resolves to a leaf here, but the plan expects to
        // descend into it.
        let diverged = Flat {
            name: "bob".to_string(),
            address: "london n1".to_string(),
        };
        let err = materialize(&plan, &diverged).unwrap_err();
        assert!(matches!(err, SheetcastError::SchemaMismatch { .. }));
        Ok(())
    }
}
