//! Compiles a [`DynamicFilter`] into a predicate over records.
//!
//! Everything that can fail (field resolution, parsing the filter value) is
//! done once in [`CompiledFilter::compile`]. A filter that cannot be
//! interpreted compiles to [`CompiledFilter::Never`] and excludes every record.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::query::{DynamicFilter, FieldValue, FilterLogic, FilterOperator, Queryable};

pub enum CompiledFilter<Q: Queryable> {
    /// No filter supplied.
    All,
    /// Unknown field, unsupported operator/logic, or an unparsable value.
    Never,
    Field {
        field: Q::Field,
        predicate: Predicate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Text {
        op: FilterOperator,
        needle: String,
        case_sensitive: bool,
    },
    Number {
        op: FilterOperator,
        value: f64,
    },
    Date {
        op: FilterOperator,
        span: DateSpan,
    },
}

impl<Q: Queryable> CompiledFilter<Q> {
    pub fn compile(filter: Option<&DynamicFilter>) -> Self {
        let Some(filter) = filter else {
            return CompiledFilter::All;
        };
        let Some(field) = Q::resolve(&filter.field) else {
            tracing::debug!(field = %filter.field, "filter on unknown field matches nothing");
            return CompiledFilter::Never;
        };
        if filter.operator == FilterOperator::Unsupported {
            return CompiledFilter::Never;
        }
        match Predicate::compile(filter) {
            Some(predicate) => CompiledFilter::Field { field, predicate },
            None => CompiledFilter::Never,
        }
    }

    pub fn matches(&self, record: &Q) -> bool {
        match self {
            CompiledFilter::All => true,
            CompiledFilter::Never => false,
            CompiledFilter::Field { field, predicate } => predicate.test(record.value(*field)),
        }
    }
}

impl Predicate {
    fn compile(filter: &DynamicFilter) -> Option<Self> {
        let op = filter.operator;
        match filter.logic {
            FilterLogic::String => Some(Predicate::Text {
                op,
                needle: if filter.is_case_sensitive {
                    filter.value.clone()
                } else {
                    filter.value.to_lowercase()
                },
                case_sensitive: filter.is_case_sensitive,
            }),
            FilterLogic::Number => {
                let value: f64 = filter.value.trim().parse().ok()?;
                value.is_finite().then_some(Predicate::Number { op, value })
            }
            FilterLogic::Date => {
                DateSpan::parse(&filter.value).map(|span| Predicate::Date { op, span })
            }
            FilterLogic::Unsupported => None,
        }
    }

    pub fn test(&self, value: FieldValue<'_>) -> bool {
        if matches!(value, FieldValue::Null) {
            return false;
        }
        match self {
            Predicate::Text {
                op,
                needle,
                case_sensitive,
            } => match value {
                FieldValue::List(items) => {
                    let hit = |item: &String| {
                        compare_text(FilterOperator::Eq, item, needle, *case_sensitive)
                    };
                    if *op == FilterOperator::Neq {
                        !items.iter().any(hit)
                    } else {
                        items
                            .iter()
                            .any(|item| compare_text(*op, item, needle, *case_sensitive))
                    }
                }
                other => other
                    .to_text()
                    .is_some_and(|text| compare_text(*op, &text, needle, *case_sensitive)),
            },
            Predicate::Number { op, value: wanted } => value
                .to_number()
                .is_some_and(|actual| compare_number(*op, actual, *wanted)),
            Predicate::Date { op, span } => value.to_date().is_some_and(|t| span.test(*op, t)),
        }
    }
}

/// `needle` is already case-folded when `case_sensitive` is false.
fn compare_text(op: FilterOperator, haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    let folded;
    let haystack = if case_sensitive {
        haystack
    } else {
        folded = haystack.to_lowercase();
        folded.as_str()
    };
    match op {
        FilterOperator::Contains => haystack.contains(needle),
        FilterOperator::Eq => haystack == needle,
        FilterOperator::Neq => haystack != needle,
        FilterOperator::StartsWith => haystack.starts_with(needle),
        FilterOperator::EndsWith => haystack.ends_with(needle),
        FilterOperator::Gt => haystack > needle,
        FilterOperator::Gte => haystack >= needle,
        FilterOperator::Lt => haystack < needle,
        FilterOperator::Lte => haystack <= needle,
        FilterOperator::Unsupported => false,
    }
}

fn compare_number(op: FilterOperator, actual: f64, wanted: f64) -> bool {
    match op {
        // contains has no substring meaning for numbers
        FilterOperator::Contains | FilterOperator::Eq => actual == wanted,
        FilterOperator::Neq => actual != wanted,
        FilterOperator::Gt => actual > wanted,
        FilterOperator::Gte => actual >= wanted,
        FilterOperator::Lt => actual < wanted,
        FilterOperator::Lte => actual <= wanted,
        FilterOperator::StartsWith | FilterOperator::EndsWith | FilterOperator::Unsupported => {
            false
        }
    }
}

/// The instant or calendar period named by a `date` filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpan {
    Instant(DateTime<Utc>),
    /// Half-open `[start, end)`.
    Period {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl DateSpan {
    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC), or a
    /// calendar prefix `YYYY-MM-DD`, `YYYY-MM`, `YYYY`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(DateSpan::Instant(t.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(DateSpan::Instant(Utc.from_utc_datetime(&naive)));
            }
        }
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Self::period(day, day.succ_opt()?);
        }

        let mut parts = raw.split('-');
        let year_part = parts.next()?;
        if year_part.len() != 4 {
            return None;
        }
        let year: i32 = year_part.parse().ok()?;
        match (parts.next(), parts.next()) {
            (None, _) => {
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                Self::period(start, NaiveDate::from_ymd_opt(year + 1, 1, 1)?)
            }
            (Some(month), None) if month.len() == 2 => {
                let start = NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1)?;
                Self::period(start, start.checked_add_months(Months::new(1))?)
            }
            _ => None,
        }
    }

    fn period(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        Some(DateSpan::Period {
            start: Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?),
            end: Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0)?),
        })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        match self {
            DateSpan::Instant(i) => t == *i,
            DateSpan::Period { start, end } => *start <= t && t < *end,
        }
    }

    fn is_before_span(&self, t: DateTime<Utc>) -> bool {
        match self {
            DateSpan::Instant(i) => t < *i,
            DateSpan::Period { start, .. } => t < *start,
        }
    }

    fn is_after_span(&self, t: DateTime<Utc>) -> bool {
        match self {
            DateSpan::Instant(i) => t > *i,
            DateSpan::Period { end, .. } => t >= *end,
        }
    }

    fn test(&self, op: FilterOperator, t: DateTime<Utc>) -> bool {
        match op {
            FilterOperator::Eq | FilterOperator::Contains | FilterOperator::StartsWith => {
                self.contains(t)
            }
            FilterOperator::Neq => !self.contains(t),
            FilterOperator::Gt => self.is_after_span(t),
            FilterOperator::Gte => !self.is_before_span(t),
            FilterOperator::Lt => self.is_before_span(t),
            FilterOperator::Lte => !self.is_after_span(t),
            FilterOperator::EndsWith | FilterOperator::Unsupported => false,
        }
    }
}
