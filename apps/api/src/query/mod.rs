//! Dynamic query engine.
//!
//! A request carries at most one filter predicate and an ordered list of sort
//! keys. Both are interpreted against any record type that implements
//! [`Queryable`], then the fully filtered and sorted set is windowed into a page.

pub mod executor;
pub mod field;
pub mod filter;
pub mod sort;

#[cfg(test)]
mod fixtures;

use serde::{Deserialize, Serialize};

pub use executor::{execute, PageRequest};
pub use field::{FieldValue, Queryable};

/// How a filter's value and the record's field value are coerced before comparing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FilterLogic {
    String,
    Number,
    Date,
    /// Any logic name this engine does not know. Matches nothing.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    Eq,
    Neq,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Any operator name this engine does not know. Matches nothing.
    #[serde(other)]
    Unsupported,
}

/// A single filter predicate. There is no AND/OR composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
    pub logic: FilterLogic,
    #[serde(default)]
    pub is_case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DynamicSort {
    pub field: String,
    #[serde(default)]
    pub dir: SortDir,
}

impl DynamicSort {
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            dir: SortDir::Desc,
        }
    }
}

/// Body of the `/dynamic` endpoints. Both members may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DynamicQueryRequest {
    #[serde(default)]
    pub filter: Option<DynamicFilter>,
    #[serde(default)]
    pub sort: Vec<DynamicSort>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}
