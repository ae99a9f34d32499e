use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::query::DynamicSort;

/// A record field's value, borrowed from the record for the duration of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// A known field with no value (e.g. an unset optional URL).
    Null,
    Text(&'a str),
    Number(f64),
    Date(DateTime<Utc>),
    Uuid(Uuid),
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// Textual rendering used by `string` logic. Lists render per element, so they return `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Null | FieldValue::List(_) => None,
            FieldValue::Text(s) => Some((*s).to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Date(d) => Some(d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            FieldValue::Uuid(u) => Some(u.to_string()),
        }
    }

    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// A record collection the query engine can filter and sort.
///
/// Field names are resolved once per query into `Self::Field`, so per-record
/// access never re-parses the name.
pub trait Queryable {
    type Field: Copy + std::fmt::Debug + 'static;

    /// Wire names (camelCase) and the fields they resolve to.
    const FIELDS: &'static [(&'static str, Self::Field)];

    fn id(&self) -> Uuid;

    fn value(&self, field: Self::Field) -> FieldValue<'_>;

    /// Ordering used when a request supplies no sort entries.
    fn default_sort() -> Vec<DynamicSort>;

    /// Resolves a wire field name, ignoring ASCII case. `None` for unknown names.
    fn resolve(name: &str) -> Option<Self::Field> {
        let name = name.trim();
        Self::FIELDS
            .iter()
            .find(|(wire, _)| wire.eq_ignore_ascii_case(name))
            .map(|(_, field)| *field)
    }
}
