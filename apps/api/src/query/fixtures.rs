//! Small record type shared by the query engine tests.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::query::{DynamicFilter, DynamicSort, FieldValue, FilterLogic, FilterOperator, Queryable};

#[derive(Debug, Clone, Copy)]
pub enum RowField {
    Id,
    Name,
    Size,
    At,
    Labels,
    Note,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub at: DateTime<Utc>,
    pub labels: Vec<String>,
    pub note: Option<String>,
}

impl Queryable for Row {
    type Field = RowField;

    const FIELDS: &'static [(&'static str, RowField)] = &[
        ("id", RowField::Id),
        ("name", RowField::Name),
        ("size", RowField::Size),
        ("at", RowField::At),
        ("labels", RowField::Labels),
        ("note", RowField::Note),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn value(&self, field: RowField) -> FieldValue<'_> {
        match field {
            RowField::Id => FieldValue::Uuid(self.id),
            RowField::Name => FieldValue::Text(&self.name),
            RowField::Size => FieldValue::Number(self.size as f64),
            RowField::At => FieldValue::Date(self.at),
            RowField::Labels => FieldValue::List(&self.labels),
            RowField::Note => self
                .note
                .as_deref()
                .map_or(FieldValue::Null, FieldValue::Text),
        }
    }

    fn default_sort() -> Vec<DynamicSort> {
        vec![DynamicSort::desc("at")]
    }
}

/// Deterministic id so tie-break order is predictable: `uuid(1) < uuid(2) < ...`.
pub fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn row(n: u128, name: &str, size: i64, day: u32) -> Row {
    Row {
        id: uuid(n),
        name: name.to_string(),
        size,
        at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        labels: vec![],
        note: None,
    }
}

pub fn filter(
    field: &str,
    operator: FilterOperator,
    value: &str,
    logic: FilterLogic,
) -> DynamicFilter {
    DynamicFilter {
        field: field.to_string(),
        operator,
        value: value.to_string(),
        logic,
        is_case_sensitive: false,
    }
}
