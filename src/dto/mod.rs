//! DTO modules that bridge services with templates and APIs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::sort::{SortField, SortKey};
use crate::pagination::Paginated;

pub mod api;
pub mod clients;
pub mod fosters;
pub mod pets;

/// Data required to render a filtered, sorted and paged list page.
#[derive(Debug, Serialize)]
pub struct ListPageData<T, F> {
    pub items: Paginated<T>,
    /// Filter form echoed back into the inputs.
    pub filter: F,
    /// Filters encoded as a query string, without sort order or page.
    pub filter_query: String,
    /// Sort key in effect, empty for the default order.
    pub sort_order: String,
    /// Next sort key per column header; empty resets to the default order.
    pub sort_links: BTreeMap<&'static str, String>,
}

impl<T, F> ListPageData<T, F> {
    pub fn new<S: SortField>(
        items: Paginated<T>,
        filter: F,
        filter_query: String,
        sort: Option<SortKey<S>>,
    ) -> Self {
        Self {
            items,
            filter,
            filter_query,
            sort_order: sort.map(|key| key.to_string()).unwrap_or_default(),
            sort_links: SortKey::toggle_links(sort),
        }
    }
}
