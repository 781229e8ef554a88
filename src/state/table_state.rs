//! Ready-to-render table state handed to the row-model layer.
//!
//! The table is always server-driven: pagination, sorting and filtering are
//! declared manual, so the row model never re-sorts or re-filters the rows it
//! was given.

use serde::Serialize;

use crate::model::column::{ColumnId, ColumnSet};
use crate::model::view_state::{ColumnFilter, ColumnVisibility, RowSelection, SortEntry, ViewState};

/// Snapshot of everything a table widget needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    /// Zero-based page index (the URL and requests use 1-based pages).
    pub page_index: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Total pages, when known.
    pub page_count: Option<u64>,
    /// Active sort order.
    pub sorting: Vec<SortEntry>,
    /// Filters as the UI shows them (not debounced).
    pub column_filters: Vec<ColumnFilter>,
    /// Visibility per column.
    pub column_visibility: ColumnVisibility,
    /// Selection per row id.
    pub row_selection: RowSelection,
    /// Always true.
    pub manual_pagination: bool,
    /// Always true.
    pub manual_sorting: bool,
    /// Always true.
    pub manual_filtering: bool,
}

impl TableState {
    /// Build from a view state and an optional page count.
    pub fn from_view(state: &ViewState, page_count: Option<u64>) -> Self {
        Self {
            page_index: state.page().saturating_sub(1),
            page_size: state.per_page(),
            page_count,
            sorting: state.sorting().to_vec(),
            column_filters: state.column_filters().to_vec(),
            column_visibility: state.column_visibility().clone(),
            row_selection: state.row_selection().clone(),
            manual_pagination: true,
            manual_sorting: true,
            manual_filtering: true,
        }
    }

    /// Whether a previous page exists.
    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Whether a next page exists. Unknown page count allows paging forward.
    pub fn can_next_page(&self) -> bool {
        match self.page_count {
            Some(count) => u64::from(self.page_index) + 1 < count,
            None => true,
        }
    }

    /// Visible column ids in declaration order.
    pub fn visible_columns<'a>(&self, columns: &'a ColumnSet) -> Vec<&'a ColumnId> {
        columns
            .iter()
            .map(|c| c.id())
            .filter(|id| self.column_visibility.get(*id).copied().unwrap_or(true))
            .collect()
    }

    /// Ids of selected rows.
    pub fn selected_rows(&self) -> Vec<&str> {
        self.row_selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

// ===== Tests =====
