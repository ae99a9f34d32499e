//! Compiles an ordered list of [`DynamicSort`] entries into a total order.
//!
//! Entries are applied in order, each one breaking ties left by the previous.
//! Records still equal after every entry are ordered by `id` ascending, so no
//! two distinct records ever compare equal and page boundaries are stable.

use std::cmp::Ordering;

use crate::query::{DynamicSort, FieldValue, Queryable, SortDir};

pub struct SortComparator<Q: Queryable> {
    keys: Vec<(Q::Field, SortDir)>,
}

impl<Q: Queryable> SortComparator<Q> {
    /// An empty `sort` falls back to the record type's default ordering.
    /// Entries naming unknown fields are dropped.
    pub fn compile(sort: &[DynamicSort]) -> Self {
        let defaults;
        let entries = if sort.is_empty() {
            defaults = Q::default_sort();
            defaults.as_slice()
        } else {
            sort
        };

        let keys = entries
            .iter()
            .filter_map(|entry| match Q::resolve(&entry.field) {
                Some(field) => Some((field, entry.dir)),
                None => {
                    tracing::debug!(field = %entry.field, "ignoring sort on unknown field");
                    None
                }
            })
            .collect();
        Self { keys }
    }

    pub fn compare(&self, a: &Q, b: &Q) -> Ordering {
        self.keys
            .iter()
            .map(|(field, dir)| {
                let ord = compare_values(a.value(*field), b.value(*field));
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id().cmp(&b.id()))
    }

    pub fn sort(&self, records: &mut [Q]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Rank used when two values of different kinds meet. Nulls sort first ascending.
fn kind_rank(value: &FieldValue<'_>) -> u8 {
    match value {
        FieldValue::Null => 0,
        FieldValue::Number(_) => 1,
        FieldValue::Date(_) => 2,
        FieldValue::Uuid(_) => 3,
        FieldValue::Text(_) => 4,
        FieldValue::List(_) => 5,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(&y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(&y),
        (FieldValue::Uuid(x), FieldValue::Uuid(y)) => x.cmp(&y),
        (FieldValue::Text(x), FieldValue::Text(y)) => compare_text(x, y),
        (FieldValue::List(x), FieldValue::List(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(p, q)| compare_text(p, q))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (a, b) => kind_rank(&a).cmp(&kind_rank(&b)),
    }
}
