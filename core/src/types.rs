//! Record traversal model for sheetcast
//!
//! Rather than inspecting arbitrary shapes through runtime reflection, a
//! record describes itself through the [`Record`] trait: one [`Field`] per
//! declared member, in declaration order, each carrying its annotation and a
//! [`FieldValue`] that classifies it as a leaf, a nested aggregate, or a
//! dynamic (map-typed) field. The schema flattener and row materializer in
//! `sheetcast-service` consume nothing else.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value, the scalar encoding every leaf renders to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// An empty cell (absent optional, missing map key)
    Empty,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// Text value
    Text(String),
    /// Timestamp value, rendered as an Excel serial day number
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Whether this cell renders as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::DateTime(dt) => write!(f, "{}", excel_serial(dt)),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// The value side of one declared field.
///
/// Timestamps and other opaque value types are `Leaf`s: they render into a
/// single cell instead of being recursed into.
pub enum FieldValue<'a> {
    /// A scalar or opaque value rendered into one cell. Absent optionals
    /// use [`CellValue::Empty`]; the field still plans one column.
    Leaf(CellValue),
    /// A nested aggregate whose members are spliced in at this position.
    /// `None` (absent optional) contributes zero columns.
    Nested(Option<&'a dyn Record>),
    /// A map-typed field whose keys become column headers. `None` (absent
    /// optional) contributes zero columns.
    Dynamic(Option<Vec<(String, CellValue)>>),
}

/// One declared member of a record.
pub struct Field<'a> {
    /// Declared field name, used for path traversal
    pub name: &'static str,
    /// Column annotation. `None` means unannotated (tolerated, empty
    /// header); `Some("")` and `Some("-")` omit the field entirely.
    pub tag: Option<&'static str>,
    /// The field's classified value
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    /// An annotated leaf field.
    #[must_use]
    pub fn leaf(name: &'static str, tag: &'static str, value: impl Into<CellValue>) -> Self {
        Self {
            name,
            tag: Some(tag),
            value: FieldValue::Leaf(value.into()),
        }
    }

    /// A leaf field without an annotation (empty header text).
    #[must_use]
    pub fn unannotated(name: &'static str, value: impl Into<CellValue>) -> Self {
        Self {
            name,
            tag: None,
            value: FieldValue::Leaf(value.into()),
        }
    }

    /// A nested aggregate field. Its members are planned as if declared at
    /// this position.
    #[must_use]
    pub fn nested(name: &'static str, record: &'a dyn Record) -> Self {
        Self {
            name,
            tag: None,
            value: FieldValue::Nested(Some(record)),
        }
    }

    /// An optional nested aggregate field.
    #[must_use]
    pub fn nested_opt(name: &'static str, record: Option<&'a dyn Record>) -> Self {
        Self {
            name,
            tag: None,
            value: FieldValue::Nested(record),
        }
    }

    /// A dynamic (map-typed) field. All of its keys share `tag`.
    #[must_use]
    pub fn dynamic(
        name: &'static str,
        tag: &'static str,
        entries: Vec<(String, CellValue)>,
    ) -> Self {
        Self {
            name,
            tag: Some(tag),
            value: FieldValue::Dynamic(Some(entries)),
        }
    }

    /// An optional dynamic field.
    #[must_use]
    pub fn dynamic_opt(
        name: &'static str,
        tag: &'static str,
        entries: Option<Vec<(String, CellValue)>>,
    ) -> Self {
        Self {
            name,
            tag: Some(tag),
            value: FieldValue::Dynamic(entries),
        }
    }
}

/// Capability trait every tabulated record type implements.
///
/// `fields` must return the record's members in declaration order and must
/// be structurally stable across all records of one collection: the column
/// plan is derived from the first record and every later record is walked
/// against it.
pub trait Record {
    /// The record's members, in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;
}

/// Convert a timestamp to an Excel serial day number (1900 date system).
///
/// Day zero is 1899-12-30; the time of day becomes the fractional part.
/// Excel's fictitious 1900-02-29 is not compensated for, so serials before
/// 1900-03-01 are off by one from Excel's own display.
#[must_use]
pub fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid calendar date");
    let days = (dt.date() - epoch).num_days() as f64;
    let seconds = f64::from(dt.time().num_seconds_from_midnight());
    days + seconds / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(1), CellValue::Int(1));
        assert_eq!(CellValue::from(2.2), CellValue::Float(2.2));
        assert_eq!(CellValue::from("example"), CellValue::Text("example".to_string()));
        assert_eq!(CellValue::from(Some(7)), CellValue::Int(7));
        assert_eq!(CellValue::from(Option::<i64>::None), CellValue::Empty);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Int(1).to_string(), "1");
        assert_eq!(CellValue::Float(2.2).to_string(), "2.2");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_excel_serial_whole_days() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        assert_eq!(excel_serial(&dt), 43_831.0);
    }

    #[test]
    fn test_excel_serial_time_fraction() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        assert_eq!(excel_serial(&dt), 43_831.5);
    }
}
