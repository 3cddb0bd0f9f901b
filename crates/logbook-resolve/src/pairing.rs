use std::collections::BTreeSet;

use logbook_core::Fields;

use crate::normalize::NormalizerTable;

/// Normalized values of one attribute from each of two records.
pub type FieldPair = (String, String);

/// Lines up the attributes of two records for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPairer {
    table: NormalizerTable,
    empty: String,
}

impl FieldPairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value used when one record lacks an attribute the other has.
    pub fn with_empty(mut self, empty: impl Into<String>) -> Self {
        self.empty = empty.into();
        self
    }

    pub fn with_table(mut self, table: NormalizerTable) -> Self {
        self.table = table;
        self
    }

    pub fn empty(&self) -> &str {
        &self.empty
    }

    pub fn table(&self) -> &NormalizerTable {
        &self.table
    }

    /// One normalized pair per attribute name in the union of both
    /// records' names, ordered by name.
    pub fn pairs<A, B>(&self, a: &A, b: &B) -> Vec<FieldPair>
    where
        A: Fields + ?Sized,
        B: Fields + ?Sized,
    {
        let names: BTreeSet<&str> = a
            .field_names()
            .into_iter()
            .chain(b.field_names())
            .collect();

        names
            .into_iter()
            .map(|name| {
                let left = a.field_value(name);
                let right = b.field_value(name);
                (
                    self.table
                        .normalize(name, left.as_deref().unwrap_or(self.empty.as_str())),
                    self.table
                        .normalize(name, right.as_deref().unwrap_or(self.empty.as_str())),
                )
            })
            .collect()
    }
}

/// [`FieldPairer::pairs`] with the standard normalizer table.
pub fn field_pairs<A, B>(a: &A, b: &B, empty: &str) -> Vec<FieldPair>
where
    A: Fields + ?Sized,
    B: Fields + ?Sized,
{
    FieldPairer::new().with_empty(empty).pairs(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logbook_core::{Detail, Entity, Record};

    fn pair(a: &str, b: &str) -> FieldPair {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn same_kind_pairs_every_field_sorted() {
        let a = Entity::new("Ben Bengfort", "BB@x.com");
        let b = Entity::new("Benjamin Bengfort", "bb@y.org");
        assert_eq!(
            field_pairs(&a, &b, ""),
            vec![pair("bb", "bb"), pair("benbengfort", "benjaminbengfort")]
        );
    }

    #[test]
    fn heterogeneous_records_fill_missing_with_empty() {
        let e = Entity::new("Ben Bengfort", "bb@x.com");
        let d = Detail::new("Machine Learning");
        assert_eq!(
            field_pairs(&e, &d, ""),
            vec![
                pair("", "machinelearning"),
                pair("bb", ""),
                pair("benbengfort", ""),
            ]
        );
    }

    #[test]
    fn empty_placeholder_is_normalized_too() {
        let e = Entity::new("Ben", "b@x.com");
        let d = Detail::new("ML");
        let pairs = FieldPairer::new().with_empty("N A").pairs(&e, &d);
        assert_eq!(pairs[0], pair("na", "ml"));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn no_fields_gives_no_pairs() {
        assert!(field_pairs(&Record::new(), &Record::new(), "").is_empty());
    }
}
