//! Typed per-field codecs for view state stored in a query string.
//!
//! Every parser is total: malformed input yields `None` (the field falls back
//! to its default) and is logged at debug level. Nothing here returns an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::query_string::{decode_component, encode_component, QueryString};
use crate::model::column::{ColumnDef, ColumnSet};
use crate::model::view_state::{ColumnFilter, FilterValue, SortEntry, Sorting};

/// Query parameter holding the 1-based page.
pub const PAGE_KEY: &str = "page";

/// Query parameter holding the page size.
pub const PER_PAGE_KEY: &str = "perPage";

/// Query parameter holding the JSON sort array.
pub const SORT_KEY: &str = "sort";

/// Separator between items of a list-valued filter.
pub const LIST_SEPARATOR: char = ',';

/// A codec for one query parameter.
///
/// `parse` receives the raw, still percent-encoded value and returns `None`
/// for anything it cannot interpret. `serialize` returns an encoded value
/// ready to be placed in a [`QueryString`].
pub trait ParamCodec {
    /// Decoded value type.
    type Value;

    /// Parse an encoded value.
    fn parse(&self, raw: &str) -> Option<Self::Value>;

    /// Encode a value.
    fn serialize(&self, value: &Self::Value) -> String;
}

// ===== Integers =====

/// Positive integer (page, page size).
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveIntCodec;

impl ParamCodec for PositiveIntCodec {
    type Value = u32;

    fn parse(&self, raw: &str) -> Option<u32> {
        let value = decode_component(raw).trim().parse::<u32>().ok()?;
        (value > 0).then_some(value)
    }

    fn serialize(&self, value: &u32) -> String {
        value.to_string()
    }
}

// ===== Sorting =====

/// JSON array of `{id, desc}` validated against the sortable columns.
#[derive(Debug, Clone, Copy)]
pub struct SortCodec<'a> {
    columns: &'a ColumnSet,
}

impl<'a> SortCodec<'a> {
    /// Codec validating against `columns`.
    pub fn new(columns: &'a ColumnSet) -> Self {
        Self { columns }
    }
}

impl ParamCodec for SortCodec<'_> {
    type Value = Sorting;

    fn parse(&self, raw: &str) -> Option<Sorting> {
        let json = decode_component(raw);
        let sorting: Sorting = match serde_json::from_str(&json) {
            Ok(sorting) => sorting,
            Err(e) => {
                debug!(raw = %json, error = %e, "Discarding malformed sort parameter");
                return None;
            }
        };

        // Fail closed: one bad entry invalidates the whole parameter.
        if let Some(bad) = sorting
            .iter()
            .find(|entry| !self.columns.is_sortable(entry.id.as_str()))
        {
            debug!(column = %bad.id, "Discarding sort parameter naming an unsortable column");
            return None;
        }
        Some(sorting)
    }

    fn serialize(&self, value: &Sorting) -> String {
        let json = serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string());
        encode_component(&json)
    }
}

// ===== Filters =====

/// How free-text filter values are restored from the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreeTextPolicy {
    /// Always one opaque string. Round-trips exactly.
    #[default]
    Opaque,
    /// Split on any non-alphanumeric, non-whitespace character and treat
    /// multiple pieces as a list. Best effort: "a,b" is indistinguishable
    /// from the single value "a,b".
    SplitOnDelimiters,
}

/// Codec for one filterable column.
///
/// Option-backed columns use a comma-separated list (each item escaped, so an
/// option containing a comma still round-trips). Free-text columns use a plain
/// escaped string interpreted per [`FreeTextPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct FilterCodec<'a> {
    column: &'a ColumnDef,
    policy: FreeTextPolicy,
}

impl<'a> FilterCodec<'a> {
    /// Codec for `column` with the given free-text policy.
    pub fn new(column: &'a ColumnDef, policy: FreeTextPolicy) -> Self {
        Self { column, policy }
    }

    fn parse_list(&self, raw: &str) -> Option<FilterValue> {
        let mut items: Vec<String> = Vec::new();
        for piece in raw.split(LIST_SEPARATOR) {
            let item = decode_component(piece);
            if item.is_empty() || items.contains(&item) {
                continue;
            }
            if !self.column.accepts_option(&item) {
                debug!(column = %self.column.id(), value = %item, "Dropping unknown filter option");
                continue;
            }
            items.push(item);
        }
        (!items.is_empty()).then_some(FilterValue::List(items))
    }

    fn parse_text(&self, raw: &str) -> Option<FilterValue> {
        let text = decode_component(raw);
        if text.is_empty() {
            return None;
        }
        match self.policy {
            FreeTextPolicy::Opaque => Some(FilterValue::Text(text)),
            FreeTextPolicy::SplitOnDelimiters => Some(split_on_delimiters(&text)),
        }
    }
}

impl ParamCodec for FilterCodec<'_> {
    type Value = FilterValue;

    fn parse(&self, raw: &str) -> Option<FilterValue> {
        if self.column.is_option_backed() {
            self.parse_list(raw)
        } else {
            self.parse_text(raw)
        }
    }

    fn serialize(&self, value: &FilterValue) -> String {
        match value {
            FilterValue::List(items) => join_list(items),
            FilterValue::Text(text) if self.column.is_option_backed() => {
                join_list(std::slice::from_ref(text))
            }
            FilterValue::Text(text) => encode_component(text),
        }
    }
}

fn join_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| encode_component(item))
        .collect::<Vec<_>>()
        .join(",")
}

/// Legacy heuristic: split a free-text value into a list on separator characters.
fn split_on_delimiters(text: &str) -> FilterValue {
    let pieces: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && !c.is_whitespace())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if pieces.len() > 1 {
        FilterValue::List(pieces)
    } else {
        FilterValue::Text(text.to_string())
    }
}

// ===== Whole-URL view =====

/// View-state fields recovered from a query string.
///
/// `None` means absent or malformed: the caller substitutes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlViewState {
    /// Parsed `page`.
    pub page: Option<u32>,
    /// Parsed `perPage`.
    pub per_page: Option<u32>,
    /// Parsed and validated `sort`.
    pub sorting: Option<Sorting>,
    /// One entry per filterable column with a valid parameter, in column order.
    pub filters: Vec<ColumnFilter>,
}

/// Parse every view-state field from `query`.
pub fn read_url_state(
    columns: &ColumnSet,
    query: &QueryString,
    policy: FreeTextPolicy,
) -> UrlViewState {
    let ints = PositiveIntCodec;
    let page = query.get_raw(PAGE_KEY).and_then(|raw| ints.parse(raw));
    let per_page = query.get_raw(PER_PAGE_KEY).and_then(|raw| ints.parse(raw));
    let sorting = query
        .get_raw(SORT_KEY)
        .and_then(|raw| SortCodec::new(columns).parse(raw));

    let filters = columns
        .filterable()
        .filter_map(|column| {
            let raw = query.get_raw(column.id().as_str())?;
            let value = FilterCodec::new(column, policy).parse(raw)?;
            Some(ColumnFilter::new(column.id().clone(), value))
        })
        .collect();

    UrlViewState {
        page,
        per_page,
        sorting,
        filters,
    }
}

/// Encode a sort order as a query value.
pub fn encode_sort(columns: &ColumnSet, sorting: &[SortEntry]) -> String {
    SortCodec::new(columns).serialize(&sorting.to_vec())
}

#[cfg(test)]
#[path = "parsers_tests.rs"]
mod tests;
