use serde::Deserialize;

use crate::errors::{AppResult, FieldErrors};
use crate::query::filter::CompiledFilter;
use crate::query::sort::SortComparator;
use crate::query::{DynamicQueryRequest, PaginatedResponse, Queryable};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// `?pageIndex&pageSize` query string. `pageIndex` is 0-based.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page_index: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl PageRequest {
    #[cfg(test)]
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    pub fn validate(&self, max_page_size: usize) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if self.page_size == 0 {
            errors.add("pageSize", "Page size must be at least 1");
        } else if self.page_size > max_page_size {
            errors.add(
                "pageSize",
                format!("Page size must not exceed {max_page_size}"),
            );
        }
        errors.into_result()
    }
}

/// Filters, sorts and windows a snapshot of a collection.
///
/// Filter and sort are applied to the whole collection before the page window
/// is cut, so `total_count` and page boundaries do not depend on the window.
pub fn execute<Q: Queryable>(
    records: Vec<Q>,
    request: &DynamicQueryRequest,
    page: PageRequest,
) -> AppResult<PaginatedResponse<Q>> {
    page.validate(usize::MAX)?;

    let filter = CompiledFilter::<Q>::compile(request.filter.as_ref());
    let mut matching: Vec<Q> = records.into_iter().filter(|r| filter.matches(r)).collect();
    SortComparator::<Q>::compile(&request.sort).sort(&mut matching);

    let total_count = matching.len();
    let total_pages = total_count.div_ceil(page.page_size);
    let start = page.page_index.saturating_mul(page.page_size);
    let items: Vec<Q> = matching
        .into_iter()
        .skip(start)
        .take(page.page_size)
        .collect();

    Ok(PaginatedResponse {
        items,
        page_index: page.page_index,
        page_size: page.page_size,
        total_count,
        total_pages,
        has_previous_page: page.page_index > 0,
        has_next_page: page.page_index.saturating_add(1) < total_pages,
    })
}
