//! Query parameters derived from view state.
//!
//! `QueryParams` is simultaneously the request shape handed to a table query
//! and the input of its cache key: two view states that would fetch the same
//! rows produce equal params.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::column::ColumnId;
use crate::model::view_state::{FilterValue, SortEntry, ViewState};

/// Flat request record: page, page size, sorting and active filters.
///
/// Serializes flat, e.g.
/// `{"page":2,"perPage":10,"sort":"[{\"id\":\"name\",\"desc\":false}]","status":["new"]}`.
/// Cleared filters never appear.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParams {
    /// 1-based page.
    pub page: u32,
    /// Page size.
    #[serde(rename = "perPage")]
    pub per_page: u32,
    /// Sort order, serialized as a JSON array string.
    #[serde(with = "sort_as_json_string")]
    pub sort: Vec<SortEntry>,
    /// Active filters keyed by column.
    #[serde(flatten)]
    pub filters: BTreeMap<ColumnId, FilterValue>,
}

impl QueryParams {
    /// Derive params from the committed parts of a view state.
    pub fn from_view_state(state: &ViewState) -> Self {
        Self {
            page: state.page(),
            per_page: state.per_page(),
            sort: state.sorting().to_vec(),
            filters: state
                .active_filters()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        }
    }

    /// Zero-based offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

mod sort_as_json_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::model::view_state::SortEntry;

    pub fn serialize<S: Serializer>(sort: &[SortEntry], s: S) -> Result<S::Ok, S::Error> {
        let json = serde_json::to_string(sort).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&json)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SortEntry>, D::Error> {
        let raw = String::deserialize(d)?;
        serde_json::from_str(&raw).map_err(D::Error::custom)
    }
}

/// Cache key of one page of results.
///
/// Built from a caller-chosen scope (e.g. "orders") and the full params, so a
/// change in any field yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    /// Key for `params` within `scope`.
    pub fn new(scope: &str, params: &QueryParams) -> Self {
        // Field order is fixed and filters are a BTreeMap, so the JSON is canonical.
        let body = serde_json::to_string(params).unwrap_or_default();
        Self(format!("{scope}:{body}"))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of rows plus the total row count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Total rows matching the filters.
    pub total: u64,
}

impl<T> PageResult<T> {
    /// Build a page result.
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    /// Number of pages at the given size.
    pub fn page_count(&self, per_page: u32) -> u64 {
        page_count(self.total, per_page)
    }
}

/// Ceiling of `total / per_page`; zero page size yields zero pages.
pub fn page_count(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page))
}

// ===== Tests =====
