//! Ordered, named record collections.
//!
//! A [`SheetSet`] maps sheet names to record collections while preserving
//! insertion order, with an optional by-name sort applied before
//! generation. [`RecordSlice`] erases the record element type so one set
//! can hold collections of different record types.

use indexmap::IndexMap;
use sheetcast_core::Record;

/// An ordered, indexable collection of records of one type.
///
/// Implemented for slices and vectors of any [`Record`] type; most callers
/// never implement it themselves.
pub trait RecordSlice {
    /// Number of records in the collection.
    fn len(&self) -> usize;

    /// Whether the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds, like slice indexing.
    fn record(&self, index: usize) -> &dyn Record;
}

impl<T: Record> RecordSlice for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn record(&self, index: usize) -> &dyn Record {
        &self[index]
    }
}

impl<T: Record> RecordSlice for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn record(&self, index: usize) -> &dyn Record {
        &self[index]
    }
}

/// Named record collections, one sheet each, in insertion order.
#[derive(Default)]
pub struct SheetSet<'a> {
    entries: IndexMap<String, &'a dyn RecordSlice>,
}

impl<'a> SheetSet<'a> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named collection. Inserting an existing name replaces its
    /// records while keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, records: &'a dyn RecordSlice) {
        self.entries.insert(name.into(), records);
    }

    /// Sort the set by sheet name, ascending or descending.
    pub fn sort_by_name(&mut self, ascending: bool) {
        self.entries.sort_by(|left, _, right, _| {
            if ascending {
                left.cmp(right)
            } else {
                right.cmp(left)
            }
        });
    }

    /// Number of collections in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate collections in set order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a dyn RecordSlice)> {
        self.entries.iter().map(|(name, records)| (name.as_str(), *records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcast_core::Field;

    struct Item {
        id: i64,
    }

    impl Record for Item {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::leaf("id", "id", self.id)]
        }
    }

    #[test]
    fn test_preserves_insertion_order() {
        let a = vec![Item { id: 1 }];
        let b = vec![Item { id: 2 }];
        let mut set = SheetSet::new();
        set.insert("zebra", &a);
        set.insert("apple", &b);

        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zebra", "apple"]);
    }

    #[test]
    fn test_sort_by_name() {
        let a = vec![Item { id: 1 }];
        let mut set = SheetSet::new();
        set.insert("sheet3", &a);
        set.insert("sheet1", &a);
        set.insert("sheet2", &a);

        set.sort_by_name(true);
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["sheet1", "sheet2", "sheet3"]);

        set.sort_by_name(false);
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["sheet3", "sheet2", "sheet1"]);
    }

    #[test]
    fn test_record_slice_for_slices_and_vecs() {
        let items = vec![Item { id: 1 }, Item { id: 2 }];
        let as_vec: &dyn RecordSlice = &items;
        let as_slice: &dyn RecordSlice = &items[1..];
        assert_eq!(as_vec.len(), 2);
        assert_eq!(as_slice.len(), 1);
        assert!(!as_vec.is_empty());
    }
}
