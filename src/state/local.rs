//! Local-mode controller.
//!
//! View state lives in memory. Every committed change re-derives the query
//! params, resolves their cache key through the caller's [`TableQuery`] and
//! fetches on a cache miss. The previous page stays on screen until the new
//! one arrives.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::model::column::ColumnSet;
use crate::model::error::FetchError;
use crate::model::query::{PageResult, QueryKey, QueryParams};
use crate::model::view_state::{
    ColumnFilter, ColumnVisibility, InitialState, RowSelection, Sorting, ViewState,
};
use crate::state::controller::{ControllerOptions, ViewStateController};
use crate::state::query_cache::{FetchState, QueryCache};
use crate::state::view_core::ViewCore;

/// Data source for a local-mode table.
///
/// `key` maps params to a cache key; `fetch` loads one page. Retries, if any,
/// are the implementation's business.
pub trait TableQuery {
    /// Row type.
    type Row;

    /// Cache key for `params`.
    fn key(&self, params: &QueryParams) -> QueryKey;

    /// Load the page described by `params`.
    fn fetch(&mut self, params: &QueryParams) -> Result<PageResult<Self::Row>, FetchError>;
}

impl<Q: TableQuery + ?Sized> TableQuery for Box<Q> {
    type Row = Q::Row;

    fn key(&self, params: &QueryParams) -> QueryKey {
        (**self).key(params)
    }

    fn fetch(&mut self, params: &QueryParams) -> Result<PageResult<Self::Row>, FetchError> {
        (**self).fetch(params)
    }
}

/// Adapts a closure into a [`TableQuery`] whose keys are scoped by name.
///
/// ```
/// use tablesync::model::{FetchError, PageResult, QueryParams};
/// use tablesync::state::QueryFn;
///
/// let query = QueryFn::new("orders", |params: &QueryParams| {
///     Ok::<_, FetchError>(PageResult::new(vec![params.page], 1))
/// });
/// # let _ = query;
/// ```
pub struct QueryFn<F> {
    scope: String,
    fetch: F,
}

impl<F> QueryFn<F> {
    /// Wrap `fetch`, scoping cache keys by `scope`.
    pub fn new(scope: impl Into<String>, fetch: F) -> Self {
        Self {
            scope: scope.into(),
            fetch,
        }
    }
}

impl<F, T> TableQuery for QueryFn<F>
where
    F: FnMut(&QueryParams) -> Result<PageResult<T>, FetchError>,
{
    type Row = T;

    fn key(&self, params: &QueryParams) -> QueryKey {
        QueryKey::new(&self.scope, params)
    }

    fn fetch(&mut self, params: &QueryParams) -> Result<PageResult<T>, FetchError> {
        (self.fetch)(params)
    }
}

/// Controller keeping view state in memory and fetching through a [`TableQuery`].
pub struct LocalController<T> {
    core: ViewCore,
    query: Box<dyn TableQuery<Row = T>>,
    cache: QueryCache<T>,
}

impl<T> LocalController<T> {
    /// Seed state from `initial` and fetch the first page.
    pub fn new(
        columns: ColumnSet,
        initial: InitialState,
        query: Box<dyn TableQuery<Row = T>>,
        options: &ControllerOptions,
    ) -> Self {
        let state = ViewState::from_initial(&columns, initial, options.per_page);
        let mut controller = Self {
            core: ViewCore::new(
                columns,
                state,
                Duration::from_millis(options.filter_debounce_ms),
            ),
            query,
            cache: QueryCache::new(options.cache_capacity),
        };
        controller.sync();
        controller
    }

    /// Rows to display and request status.
    pub fn fetch_state(&self) -> FetchState<'_, T> {
        self.cache.state()
    }

    /// Fetch the current page again, keeping it on screen meanwhile.
    pub fn refetch(&mut self) {
        let key = self.query.key(&self.query_params());
        self.cache.set_latest(key.clone());
        self.fetch(key);
    }

    /// Make the cache point at the current params, fetching on a miss.
    fn sync(&mut self) {
        let key = self.query.key(&self.query_params());
        if self.cache.set_latest(key.clone()) {
            self.fetch(key);
        } else {
            debug!(key = %key, "Serving page from cache");
        }
    }

    fn fetch(&mut self, key: QueryKey) {
        let params = self.query_params();
        if let Some(request) = self.cache.begin(key) {
            let result = self.query.fetch(&params);
            self.cache.resolve(request, result);
        }
    }
}

impl<T> ViewStateController for LocalController<T> {
    fn columns(&self) -> &ColumnSet {
        &self.core.columns
    }

    fn view_state(&self) -> &ViewState {
        &self.core.state
    }

    fn page_count(&self) -> Option<u64> {
        self.cache
            .state()
            .data
            .map(|page| page.page_count(self.core.state.per_page()))
    }

    fn on_pagination_change(&mut self, page: u32, per_page: u32, _now: Instant) {
        if self.core.set_pagination(page, per_page).is_some() {
            self.sync();
        }
    }

    fn on_sorting_change(&mut self, sorting: Sorting, _now: Instant) {
        if self.core.set_sorting(sorting) {
            self.sync();
        }
    }

    fn on_column_filters_change(&mut self, filters: Vec<ColumnFilter>, now: Instant) {
        self.core.stage_filters(filters, now);
    }

    fn on_column_visibility_change(&mut self, visibility: ColumnVisibility) {
        self.core.set_visibility(visibility);
    }

    fn on_row_selection_change(&mut self, selection: RowSelection) {
        self.core.set_selection(selection);
    }

    fn tick(&mut self, now: Instant) {
        if self.core.poll_filters(now).is_some() {
            self.sync();
        }
    }

    fn flush(&mut self, _now: Instant) {
        if self.core.flush_filters().is_some() {
            self.sync();
        }
    }

    fn has_pending(&self) -> bool {
        self.core.filters_pending()
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
