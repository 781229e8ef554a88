//! Transitions shared by both controller modes.
//!
//! Owns the column set, the view state and the filter debouncer. The mode
//! controllers wrap it and add their own side effects (fetching or URL writes).

use std::time::{Duration, Instant};
use tracing::debug;

use crate::model::column::ColumnSet;
use crate::model::view_state::{
    sanitize_filters, sanitize_sorting, ColumnFilter, ColumnVisibility, FilterMap, Pagination,
    RowSelection, Sorting, ViewState,
};
use crate::state::debounce::Debouncer;
use crate::state::filter_diff::{filter_delta, merge_deltas};

#[derive(Debug)]
pub(crate) struct ViewCore {
    pub(crate) columns: ColumnSet,
    pub(crate) state: ViewState,
    filter_debounce: Debouncer<FilterMap>,
}

impl ViewCore {
    pub(crate) fn new(columns: ColumnSet, state: ViewState, filter_debounce: Duration) -> Self {
        Self {
            columns,
            state,
            filter_debounce: Debouncer::new(filter_debounce),
        }
    }

    /// Apply a pagination change. Returns the new pagination, or `None` if
    /// the values were invalid or unchanged.
    pub(crate) fn set_pagination(&mut self, page: u32, per_page: u32) -> Option<Pagination> {
        let Some(next) = Pagination::new(page, per_page) else {
            debug!(page, per_page, "Ignoring invalid pagination change");
            return None;
        };
        if next == self.state.pagination {
            return None;
        }
        self.state.pagination = next;
        Some(next)
    }

    /// Replace the sort order (unsortable entries dropped). Returns true on change.
    pub(crate) fn set_sorting(&mut self, sorting: Sorting) -> bool {
        let sorting = sanitize_sorting(&self.columns, sorting);
        if sorting == self.state.sorting {
            return false;
        }
        self.state.sorting = sorting;
        true
    }

    /// Update the UI filter list now and stage the delta for a debounced commit.
    pub(crate) fn stage_filters(&mut self, filters: Vec<ColumnFilter>, now: Instant) {
        let next = sanitize_filters(&self.columns, filters);
        let delta = filter_delta(&self.columns, &self.state.column_filters, &next);
        self.state.column_filters = next;
        if delta.is_empty() {
            return;
        }
        self.filter_debounce.push_merge(delta, now, merge_deltas);
    }

    /// Commit the staged delta if its quiet period elapsed.
    pub(crate) fn poll_filters(&mut self, now: Instant) -> Option<FilterMap> {
        let delta = self.filter_debounce.poll(now)?;
        Some(self.commit(delta))
    }

    /// Commit the staged delta immediately.
    pub(crate) fn flush_filters(&mut self) -> Option<FilterMap> {
        let delta = self.filter_debounce.flush()?;
        Some(self.commit(delta))
    }

    /// Drop the staged delta without committing it.
    pub(crate) fn cancel_filters(&mut self) {
        self.filter_debounce.cancel();
    }

    pub(crate) fn filters_pending(&self) -> bool {
        self.filter_debounce.is_pending()
    }

    pub(crate) fn set_visibility(&mut self, visibility: ColumnVisibility) {
        self.state.set_visibility(&self.columns, visibility);
    }

    pub(crate) fn set_selection(&mut self, selection: RowSelection) {
        self.state.row_selection = selection;
    }

    fn commit(&mut self, delta: FilterMap) -> FilterMap {
        debug!(columns = delta.len(), "Committing filter change");
        self.state.commit_filter_delta(delta.clone());
        delta
    }
}
