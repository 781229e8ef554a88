//! In-memory tabular view state.
//!
//! `ViewState` holds everything a table view needs to render and to build
//! its data request: pagination, sorting, column filters (both the UI-facing
//! list and the committed canonical map), column visibility and row selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::column::{ColumnDef, ColumnId, ColumnSet};

/// Default first page (1-based).
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size.
pub const DEFAULT_PER_PAGE: u32 = 10;

// ===== Sorting =====

/// One sort key. `desc == false` means ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortEntry {
    /// Column being sorted.
    pub id: ColumnId,
    /// Descending order when true.
    pub desc: bool,
}

impl SortEntry {
    /// Ascending sort on `id`.
    pub fn asc(id: ColumnId) -> Self {
        Self { id, desc: false }
    }

    /// Descending sort on `id`.
    pub fn desc(id: ColumnId) -> Self {
        Self { id, desc: true }
    }
}

/// Ordered list of sort keys, highest priority first.
pub type Sorting = Vec<SortEntry>;

/// Keep only entries on sortable columns, first occurrence of each column wins.
pub fn sanitize_sorting(columns: &ColumnSet, sorting: Sorting) -> Sorting {
    let mut out: Sorting = Vec::with_capacity(sorting.len());
    for entry in sorting {
        if columns.is_sortable(entry.id.as_str()) && !out.iter().any(|e| e.id == entry.id) {
            out.push(entry);
        }
    }
    out
}

// ===== Filters =====

/// Value of a column filter.
///
/// Option-backed columns filter by a list of selected options; free-text
/// columns by a single string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Free-text value.
    Text(String),
    /// Selected options.
    List(Vec<String>),
}

impl FilterValue {
    /// Convenience constructor for list values.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Empty text or empty list. Treated as "no filter".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

/// A filter as the table UI reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Filtered column.
    pub id: ColumnId,
    /// Filter value.
    pub value: FilterValue,
}

impl ColumnFilter {
    /// Build a filter entry.
    pub fn new(id: ColumnId, value: FilterValue) -> Self {
        Self { id, value }
    }
}

/// Canonical committed filters.
///
/// `None` is an explicit "cleared" marker: the column had a filter that the
/// user removed. Request builders skip cleared entries; URL writers remove the
/// parameter.
pub type FilterMap = BTreeMap<ColumnId, Option<FilterValue>>;

/// Column id -> visible.
pub type ColumnVisibility = BTreeMap<ColumnId, bool>;

/// Row id -> selected.
pub type RowSelection = BTreeMap<String, bool>;

/// Keep filterable columns with non-empty values, first occurrence wins.
///
/// Values on option-backed columns become a list of declared options, so what
/// is staged is exactly what a reload restores.
pub fn sanitize_filters(columns: &ColumnSet, filters: Vec<ColumnFilter>) -> Vec<ColumnFilter> {
    let mut out: Vec<ColumnFilter> = Vec::with_capacity(filters.len());
    for filter in filters {
        let Some(column) = columns.get(filter.id.as_str()).filter(|c| c.is_filterable()) else {
            continue;
        };
        if out.iter().any(|f| f.id == filter.id) {
            continue;
        }
        let value = if column.is_option_backed() {
            normalize_options(column, filter.value)
        } else {
            filter.value
        };
        if !value.is_empty() {
            out.push(ColumnFilter::new(filter.id, value));
        }
    }
    out
}

fn normalize_options(column: &ColumnDef, value: FilterValue) -> FilterValue {
    let items = match value {
        FilterValue::Text(text) => vec![text],
        FilterValue::List(items) => items,
    };
    let mut kept: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if column.accepts_option(&item) && !kept.contains(&item) {
            kept.push(item);
        }
    }
    FilterValue::List(kept)
}

// ===== Pagination =====

/// Page number (1-based) and page size. Both always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    /// Smart constructor: `None` if either value is zero.
    pub fn new(page: u32, per_page: u32) -> Option<Self> {
        (page >= 1 && per_page >= 1).then_some(Self { page, per_page })
    }

    /// First page with the given size (zero size falls back to the default).
    pub fn first(per_page: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: if per_page == 0 { DEFAULT_PER_PAGE } else { per_page },
        }
    }

    /// 1-based page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Same size, back to page 1.
    pub fn reset_page(self) -> Self {
        Self {
            page: DEFAULT_PAGE,
            ..self
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

// ===== Initial state =====

/// Caller-supplied starting values. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialState {
    /// Starting page (default 1).
    pub page: Option<u32>,
    /// Starting page size (default 10, or the configured default).
    pub per_page: Option<u32>,
    /// Starting sort order.
    pub sorting: Sorting,
    /// Starting column filters.
    pub column_filters: Vec<ColumnFilter>,
    /// Starting visibility overrides; unlisted columns are visible.
    pub column_visibility: ColumnVisibility,
    /// Starting row selection.
    pub row_selection: RowSelection,
}

// ===== ViewState =====

/// Complete view state of one table.
///
/// Mutated only by the controllers in [`crate::state`], which enforce the
/// column-flag invariants on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub(crate) pagination: Pagination,
    pub(crate) sorting: Sorting,
    pub(crate) column_filters: Vec<ColumnFilter>,
    pub(crate) filter_values: FilterMap,
    pub(crate) column_visibility: ColumnVisibility,
    pub(crate) row_selection: RowSelection,
}

impl ViewState {
    /// Seed a view state from an initial-state argument.
    ///
    /// Invalid page values fall back to defaults, sorting and filters on
    /// columns lacking the matching flag are dropped, and every column starts
    /// visible unless overridden (non-hideable columns stay visible).
    pub fn from_initial(columns: &ColumnSet, initial: InitialState, default_per_page: u32) -> Self {
        let per_page = initial
            .per_page
            .filter(|p| *p > 0)
            .unwrap_or(if default_per_page == 0 {
                DEFAULT_PER_PAGE
            } else {
                default_per_page
            });
        let page = initial.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let pagination = Pagination::new(page, per_page).unwrap_or_default();

        let column_filters = sanitize_filters(columns, initial.column_filters);
        let filter_values = column_filters
            .iter()
            .map(|f| (f.id.clone(), Some(f.value.clone())))
            .collect();

        let mut column_visibility: ColumnVisibility =
            columns.iter().map(|c| (c.id().clone(), true)).collect();
        for (id, visible) in initial.column_visibility {
            if visible || columns.is_hideable(id.as_str()) {
                if let Some(slot) = column_visibility.get_mut(&id) {
                    *slot = visible;
                }
            }
        }

        Self {
            pagination,
            sorting: sanitize_sorting(columns, initial.sorting),
            column_filters,
            filter_values,
            column_visibility,
            row_selection: initial.row_selection,
        }
    }

    /// Current page and page size.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Current 1-based page.
    pub fn page(&self) -> u32 {
        self.pagination.page
    }

    /// Current page size.
    pub fn per_page(&self) -> u32 {
        self.pagination.per_page
    }

    /// Active sort order.
    pub fn sorting(&self) -> &[SortEntry] {
        &self.sorting
    }

    /// Filters as last reported by the UI (updated immediately, not debounced).
    pub fn column_filters(&self) -> &[ColumnFilter] {
        &self.column_filters
    }

    /// Committed filter map including explicit clears.
    pub fn filter_values(&self) -> &FilterMap {
        &self.filter_values
    }

    /// Committed filters that are currently active.
    pub fn active_filters(&self) -> impl Iterator<Item = (&ColumnId, &FilterValue)> {
        self.filter_values
            .iter()
            .filter_map(|(id, value)| value.as_ref().map(|v| (id, v)))
    }

    /// Visibility per column.
    pub fn column_visibility(&self) -> &ColumnVisibility {
        &self.column_visibility
    }

    /// Selection per row id.
    pub fn row_selection(&self) -> &RowSelection {
        &self.row_selection
    }

    /// Merge a settled filter delta into the canonical map and go back to page 1.
    pub(crate) fn commit_filter_delta(&mut self, delta: FilterMap) {
        for (id, value) in delta {
            self.filter_values.insert(id, value);
        }
        self.pagination = self.pagination.reset_page();
    }

    /// Apply a visibility change; hiding non-hideable columns is ignored.
    pub(crate) fn set_visibility(&mut self, columns: &ColumnSet, visibility: ColumnVisibility) {
        for (id, visible) in visibility {
            if columns.get(id.as_str()).is_none() {
                continue;
            }
            if !visible && !columns.is_hideable(id.as_str()) {
                continue;
            }
            self.column_visibility.insert(id, visible);
        }
    }
}

// ===== Tests =====
