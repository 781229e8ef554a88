//! Controller interface and mode selection.
//!
//! Both modes expose the same [`ViewStateController`] surface. The mode is a
//! discriminant chosen once at construction; [`TableController`] is the
//! tagged variant that dispatches to the concrete implementation.

use std::time::Instant;

use crate::model::column::ColumnSet;
use crate::model::query::QueryParams;
use crate::model::view_state::{
    ColumnFilter, ColumnVisibility, InitialState, RowSelection, Sorting, ViewState,
    DEFAULT_PER_PAGE,
};
use crate::state::debounce::DEFAULT_FILTER_DEBOUNCE_MS;
use crate::state::history::{History, MemoryHistory};
use crate::state::local::{LocalController, TableQuery};
use crate::state::query_cache::{FetchState, DEFAULT_CACHE_CAPACITY};
use crate::state::search_params::{SearchParamsController, SearchParamsOptions};
use crate::state::table_state::TableState;

/// Options shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Page size used when the initial state does not name one.
    pub per_page: u32,
    /// Quiet period before a filter edit is committed.
    pub filter_debounce_ms: u64,
    /// Pages kept by the local-mode cache.
    pub cache_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            filter_debounce_ms: DEFAULT_FILTER_DEBOUNCE_MS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Event-driven table view-state controller.
///
/// Pagination and sorting apply immediately. Filter edits update the UI
/// filter list immediately but are committed (and the page reset to 1) only
/// after the debounce window settles, which happens inside [`tick`] or
/// [`flush`].
///
/// [`tick`]: ViewStateController::tick
/// [`flush`]: ViewStateController::flush
pub trait ViewStateController {
    /// Column definitions this controller validates against.
    fn columns(&self) -> &ColumnSet;

    /// Current view state.
    fn view_state(&self) -> &ViewState;

    /// Total pages, if known.
    fn page_count(&self) -> Option<u64>;

    /// New page and page size.
    fn on_pagination_change(&mut self, page: u32, per_page: u32, now: Instant);

    /// New sort order.
    fn on_sorting_change(&mut self, sorting: Sorting, now: Instant);

    /// New complete filter list as reported by the UI.
    fn on_column_filters_change(&mut self, filters: Vec<ColumnFilter>, now: Instant);

    /// Visibility changes. Never persisted.
    fn on_column_visibility_change(&mut self, visibility: ColumnVisibility);

    /// Row selection. Never persisted.
    fn on_row_selection_change(&mut self, selection: RowSelection);

    /// Settle any debounced or throttled work whose time has come.
    fn tick(&mut self, now: Instant);

    /// Settle all pending work immediately.
    fn flush(&mut self, now: Instant);

    /// True while a filter commit or URL write is outstanding.
    fn has_pending(&self) -> bool;

    /// Request params derived from the committed state.
    fn query_params(&self) -> QueryParams {
        QueryParams::from_view_state(self.view_state())
    }

    /// Ready-to-render table state.
    fn table_state(&self) -> TableState {
        TableState::from_view(self.view_state(), self.page_count())
    }
}

/// Operating mode, with what each mode needs.
pub enum Mode<T, H = MemoryHistory> {
    /// View state in memory; rows fetched through `query`.
    Local {
        /// Data source.
        query: Box<dyn TableQuery<Row = T>>,
    },
    /// View state in the URL; the caller fetches rows using `query_params`.
    SearchParams {
        /// Location source and sink.
        history: H,
        /// URL write behavior.
        options: SearchParamsOptions,
    },
}

/// A controller in one of the two modes.
pub enum TableController<T, H = MemoryHistory> {
    /// Local mode.
    Local(LocalController<T>),
    /// Search-params mode.
    SearchParams(SearchParamsController<H>),
}

/// Build a controller with default options.
pub fn initialize<T, H: History>(
    columns: ColumnSet,
    initial: InitialState,
    mode: Mode<T, H>,
) -> TableController<T, H> {
    initialize_with(columns, initial, mode, &ControllerOptions::default())
}

/// Build a controller.
pub fn initialize_with<T, H: History>(
    columns: ColumnSet,
    initial: InitialState,
    mode: Mode<T, H>,
    options: &ControllerOptions,
) -> TableController<T, H> {
    match mode {
        Mode::Local { query } => {
            TableController::Local(LocalController::new(columns, initial, query, options))
        }
        Mode::SearchParams {
            history,
            options: url_options,
        } => TableController::SearchParams(SearchParamsController::new(
            columns,
            initial,
            history,
            url_options,
            options,
        )),
    }
}

impl<T, H: History> TableController<T, H> {
    fn inner(&self) -> &dyn ViewStateController {
        match self {
            Self::Local(c) => c,
            Self::SearchParams(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ViewStateController {
        match self {
            Self::Local(c) => c,
            Self::SearchParams(c) => c,
        }
    }

    /// Fetch state, in local mode only.
    pub fn fetch_state(&self) -> Option<FetchState<'_, T>> {
        match self {
            Self::Local(c) => Some(c.fetch_state()),
            Self::SearchParams(_) => None,
        }
    }

    /// Local-mode controller, if that is the active mode.
    pub fn as_local(&self) -> Option<&LocalController<T>> {
        match self {
            Self::Local(c) => Some(c),
            Self::SearchParams(_) => None,
        }
    }

    /// Search-params controller, if that is the active mode.
    pub fn as_search_params(&self) -> Option<&SearchParamsController<H>> {
        match self {
            Self::Local(_) => None,
            Self::SearchParams(c) => Some(c),
        }
    }

    /// Mutable search-params controller, e.g. to report a total.
    pub fn as_search_params_mut(&mut self) -> Option<&mut SearchParamsController<H>> {
        match self {
            Self::Local(_) => None,
            Self::SearchParams(c) => Some(c),
        }
    }
}

impl<T, H: History> ViewStateController for TableController<T, H> {
    fn columns(&self) -> &ColumnSet {
        self.inner().columns()
    }

    fn view_state(&self) -> &ViewState {
        self.inner().view_state()
    }

    fn page_count(&self) -> Option<u64> {
        self.inner().page_count()
    }

    fn on_pagination_change(&mut self, page: u32, per_page: u32, now: Instant) {
        self.inner_mut().on_pagination_change(page, per_page, now);
    }

    fn on_sorting_change(&mut self, sorting: Sorting, now: Instant) {
        self.inner_mut().on_sorting_change(sorting, now);
    }

    fn on_column_filters_change(&mut self, filters: Vec<ColumnFilter>, now: Instant) {
        self.inner_mut().on_column_filters_change(filters, now);
    }

    fn on_column_visibility_change(&mut self, visibility: ColumnVisibility) {
        self.inner_mut().on_column_visibility_change(visibility);
    }

    fn on_row_selection_change(&mut self, selection: RowSelection) {
        self.inner_mut().on_row_selection_change(selection);
    }

    fn tick(&mut self, now: Instant) {
        self.inner_mut().tick(now);
    }

    fn flush(&mut self, now: Instant) {
        self.inner_mut().flush(now);
    }

    fn has_pending(&self) -> bool {
        self.inner().has_pending()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::column::{ColumnDef, ColumnId};
    use crate::model::error::FetchError;
    use crate::model::query::PageResult;
    use crate::model::view_state::FilterValue;
    use crate::state::local::QueryFn;
    use std::time::Duration;

    fn id(s: &str) -> ColumnId {
        ColumnId::new(s).unwrap()
    }

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDef::new(id("name")).sortable().filterable(),
            ColumnDef::new(id("status"))
                .filterable()
                .with_options(["new", "read"]),
        ])
        .unwrap()
    }

    fn local_mode() -> Mode<u32, MemoryHistory> {
        Mode::Local {
            query: Box::new(QueryFn::new("rows", |p: &QueryParams| {
                Ok::<_, FetchError>(PageResult::new(vec![p.page], 95))
            })),
        }
    }

    fn url_mode(query: &str) -> Mode<u32, MemoryHistory> {
        Mode::SearchParams {
            history: MemoryHistory::new(query),
            options: SearchParamsOptions::default(),
        }
    }

    #[test]
    fn initialize_selects_local_variant() {
        let controller = initialize(columns(), InitialState::default(), local_mode());
        assert!(controller.as_local().is_some());
        assert!(controller.fetch_state().is_some());
    }

    #[test]
    fn initialize_selects_search_params_variant() {
        let controller = initialize(columns(), InitialState::default(), url_mode("?page=3"));
        assert!(controller.as_search_params().is_some());
        assert!(controller.fetch_state().is_none());
        assert_eq!(controller.view_state().page(), 3);
    }

    #[test]
    fn both_modes_share_the_same_surface() {
        let t0 = Instant::now();
        for mut controller in [
            initialize(columns(), InitialState::default(), local_mode()),
            initialize(columns(), InitialState::default(), url_mode("")),
        ] {
            controller.on_pagination_change(4, 10, t0);
            controller.on_column_filters_change(
                vec![ColumnFilter::new(id("name"), FilterValue::Text("ann".into()))],
                t0,
            );
            assert_eq!(controller.view_state().page(), 4);
            assert!(controller.has_pending());

            controller.tick(t0 + Duration::from_millis(DEFAULT_FILTER_DEBOUNCE_MS));
            assert_eq!(controller.view_state().page(), 1);
            assert_eq!(controller.query_params().filters.len(), 1);
        }
    }

    #[test]
    fn local_page_count_from_total() {
        let controller = initialize(columns(), InitialState::default(), local_mode());
        assert_eq!(controller.page_count(), Some(10));
        assert_eq!(controller.table_state().page_count, Some(10));
    }

    #[test]
    fn custom_options_apply() {
        let options = ControllerOptions {
            per_page: 25,
            filter_debounce_ms: 0,
            ..Default::default()
        };
        let mut controller =
            initialize_with(columns(), InitialState::default(), local_mode(), &options);
        assert_eq!(controller.view_state().per_page(), 25);

        let t0 = Instant::now();
        controller.on_column_filters_change(
            vec![ColumnFilter::new(id("status"), FilterValue::list(["new"]))],
            t0,
        );
        controller.tick(t0);
        assert!(!controller.has_pending());
    }
}
