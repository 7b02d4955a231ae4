//! Map-key consistency validation.
//!
//! Dynamic-field columns are positionally fixed from the first record of a
//! collection. A later record with a different key set would silently land
//! values under the wrong headers, so key sets are collected for every
//! record and compared once all rows are written; any divergence is a hard
//! error.

use super::plan::{FieldPath, PathStep};
use sheetcast_core::{FieldValue, Record, Result, SheetcastError};
use std::collections::BTreeSet;

/// Collects the key set of every dynamic field across all records of one
/// collection. Created from the plan's dynamic-field paths, fed once per
/// record, validated once at the end, then discarded.
#[derive(Debug, Default)]
pub struct MapKeyTracker {
    fields: Vec<TrackedField>,
}

#[derive(Debug)]
struct TrackedField {
    path: FieldPath,
    observed: Vec<BTreeSet<String>>,
}

impl MapKeyTracker {
    /// Track the dynamic fields recorded by the flattener.
    #[must_use]
    pub fn new(dynamic_fields: &[FieldPath]) -> Self {
        Self {
            fields: dynamic_fields
                .iter()
                .map(|path| TrackedField {
                    path: path.clone(),
                    observed: Vec::new(),
                })
                .collect(),
        }
    }

    /// Collect one record's key set for every tracked field.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::SchemaMismatch`] when a tracked path does
    /// not resolve to a map-typed field on this record.
    pub fn observe(&mut self, record: &dyn Record) -> Result<()> {
        for field in &mut self.fields {
            let keys = dynamic_keys(record, &field.path)?;
            field.observed.push(keys);
        }
        Ok(())
    }

    /// Validate that every record exposed the first record's key set.
    ///
    /// # Errors
    ///
    /// Returns [`SheetcastError::InconsistentMapKeys`] naming the first
    /// diverging field.
    pub fn finish(self) -> Result<()> {
        for field in &self.fields {
            let Some(first) = field.observed.first() else {
                continue;
            };
            if field.observed.iter().any(|keys| keys != first) {
                return Err(SheetcastError::inconsistent_map_keys(field.path.leaf_name()));
            }
        }
        Ok(())
    }
}

/// Read the key set of the map-typed field addressed by `path`. An absent
/// optional anywhere along the path reads as the empty key set.
fn dynamic_keys(record: &dyn Record, path: &FieldPath) -> Result<BTreeSet<String>> {
    walk(record, path.steps(), path)
}

fn walk(record: &dyn Record, steps: &[PathStep], path: &FieldPath) -> Result<BTreeSet<String>> {
    let Some((PathStep::Field(name), rest)) = steps.split_first() else {
        return Err(mismatch(path, "dynamic-field path must end in a field step"));
    };

    let fields = record.fields();
    let Some(field) = fields.iter().find(|f| f.name == *name) else {
        return Err(mismatch(path, format!("field '{name}' missing from record")));
    };

    match &field.value {
        FieldValue::Dynamic(Some(entries)) if rest.is_empty() => {
            Ok(entries.iter().map(|(key, _)| key.clone()).collect())
        }
        FieldValue::Dynamic(None) if rest.is_empty() => Ok(BTreeSet::new()),
        FieldValue::Nested(Some(inner)) if !rest.is_empty() => walk(*inner, rest, path),
        FieldValue::Nested(None) if !rest.is_empty() => Ok(BTreeSet::new()),
        _ => Err(mismatch(path, format!("field '{name}' is not map-typed"))),
    }
}

fn mismatch(path: &FieldPath, message: impl Into<String>) -> SheetcastError {
    SheetcastError::schema_mismatch(path.to_string(), message)
}
