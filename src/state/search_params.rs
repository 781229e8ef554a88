//! Search-params-mode controller.
//!
//! View state round-trips through the location's query string. Reads happen
//! once at construction (and again on [`SearchParamsController::on_location_change`]);
//! writes update an in-memory [`QueryString`] immediately and reach the
//! [`History`] throttled, or debounced when a URL debounce is configured.
//! Visibility and row selection never touch the URL.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::codec::parsers::{
    read_url_state, FilterCodec, FreeTextPolicy, ParamCodec, PositiveIntCodec, SortCodec,
    PAGE_KEY, PER_PAGE_KEY, SORT_KEY,
};
use crate::codec::query_string::QueryString;
use crate::model::column::ColumnSet;
use crate::model::view_state::{
    ColumnFilter, ColumnVisibility, FilterMap, InitialState, RowSelection, Sorting, ViewState,
    DEFAULT_PAGE,
};
use crate::state::controller::{ControllerOptions, ViewStateController};
use crate::state::debounce::{Debouncer, Throttle};
use crate::state::history::{History, WriteOptions};
use crate::state::view_core::ViewCore;

/// Default minimum interval between URL writes.
pub const DEFAULT_THROTTLE_MS: u64 = 50;

/// URL write behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParamsOptions {
    /// Push/replace, shallow and scroll flags for every write.
    pub write: WriteOptions,
    /// Minimum interval between writes.
    pub throttle_ms: u64,
    /// When set, writes wait for this quiet period instead of being throttled.
    pub debounce_ms: Option<u64>,
    /// Remove a parameter when it is set back to its default.
    pub clear_on_default: bool,
    /// Interpretation of free-text filter values read from the URL.
    pub free_text_policy: FreeTextPolicy,
}

impl Default for SearchParamsOptions {
    fn default() -> Self {
        Self {
            write: WriteOptions::default(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            debounce_ms: None,
            clear_on_default: false,
            free_text_policy: FreeTextPolicy::default(),
        }
    }
}

#[derive(Debug)]
enum WriteGate {
    Throttled(Throttle),
    Debounced(Debouncer<()>),
}

/// Controller whose view state lives in the URL.
#[derive(Debug)]
pub struct SearchParamsController<H> {
    core: ViewCore,
    history: H,
    options: SearchParamsOptions,
    default_per_page: u32,
    location: QueryString,
    dirty: bool,
    gate: WriteGate,
    total: Option<u64>,
}

impl<H: History> SearchParamsController<H> {
    /// Seed state from the current location, falling back to `initial`.
    ///
    /// Malformed parameters are ignored field by field. Nothing is written
    /// back until the first change.
    pub fn new(
        columns: ColumnSet,
        initial: InitialState,
        history: H,
        options: SearchParamsOptions,
        controller: &ControllerOptions,
    ) -> Self {
        let location = QueryString::parse(&history.query());
        let default_per_page = initial
            .per_page
            .filter(|p| *p > 0)
            .unwrap_or(controller.per_page);
        let state = Self::state_from_location(&columns, &location, initial, &options, default_per_page);

        let gate = match options.debounce_ms {
            Some(ms) => WriteGate::Debounced(Debouncer::new(Duration::from_millis(ms))),
            None => WriteGate::Throttled(Throttle::new(Duration::from_millis(options.throttle_ms))),
        };

        Self {
            core: ViewCore::new(
                columns,
                state,
                Duration::from_millis(controller.filter_debounce_ms),
            ),
            history,
            options,
            default_per_page,
            location,
            dirty: false,
            gate,
            total: None,
        }
    }

    fn state_from_location(
        columns: &ColumnSet,
        location: &QueryString,
        initial: InitialState,
        options: &SearchParamsOptions,
        default_per_page: u32,
    ) -> ViewState {
        let url = read_url_state(columns, location, options.free_text_policy);
        let has_filter_params = columns
            .filterable()
            .any(|c| location.contains(c.id().as_str()));

        let seeded = InitialState {
            page: url.page.or(initial.page),
            per_page: url.per_page.or(initial.per_page),
            sorting: url.sorting.unwrap_or(initial.sorting),
            column_filters: if has_filter_params {
                url.filters
            } else {
                initial.column_filters
            },
            column_visibility: initial.column_visibility,
            row_selection: initial.row_selection,
        };
        ViewState::from_initial(columns, seeded, default_per_page)
    }

    /// Re-read the state after an external navigation (back/forward).
    ///
    /// Pending filter edits are dropped; visibility and selection are kept.
    pub fn on_location_change(&mut self) {
        self.location = QueryString::parse(&self.history.query());
        self.dirty = false;
        self.core.cancel_filters();

        let initial = InitialState {
            column_visibility: self.core.state.column_visibility.clone(),
            row_selection: self.core.state.row_selection.clone(),
            ..Default::default()
        };
        self.core.state = Self::state_from_location(
            &self.core.columns,
            &self.location,
            initial,
            &self.options,
            self.default_per_page,
        );
        debug!(location = %self.location, "View state reloaded from location");
    }

    /// Total rows reported by the caller's fetch; drives the page count.
    pub fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    /// Query string as it will be (or has been) written.
    pub fn location(&self) -> String {
        self.location.render()
    }

    /// Backing history.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Options this controller writes with.
    pub fn options(&self) -> &SearchParamsOptions {
        &self.options
    }

    // ===== URL writes =====

    fn write_int(&mut self, key: &str, value: u32, default: u32) {
        if self.options.clear_on_default && value == default {
            self.location.remove(key);
        } else {
            self.location.set_raw(key, PositiveIntCodec.serialize(&value));
        }
    }

    fn write_sorting(&mut self) {
        let sorting = self.core.state.sorting.clone();
        if self.options.clear_on_default && sorting.is_empty() {
            self.location.remove(SORT_KEY);
        } else {
            let encoded = SortCodec::new(&self.core.columns).serialize(&sorting);
            self.location.set_raw(SORT_KEY, encoded);
        }
    }

    fn write_filters(&mut self, delta: &FilterMap) {
        for (id, value) in delta {
            let Some(column) = self.core.columns.get(id.as_str()) else {
                continue;
            };
            let encoded = value.as_ref().map(|v| {
                FilterCodec::new(column, self.options.free_text_policy).serialize(v)
            });
            match encoded {
                Some(encoded) if !encoded.is_empty() => self.location.set_raw(id.as_str(), encoded),
                _ => {
                    self.location.remove(id.as_str());
                }
            }
        }
    }

    fn schedule_write(&mut self, now: Instant) {
        self.dirty = true;
        let fire = match &mut self.gate {
            WriteGate::Throttled(throttle) => throttle.request(now),
            WriteGate::Debounced(debouncer) => {
                debouncer.push((), now);
                false
            }
        };
        if fire {
            self.write_location();
        }
    }

    fn write_location(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let rendered = self.location.render();
        if rendered == self.history.query() {
            return;
        }
        debug!(query = %rendered, history = ?self.options.write.history, "Writing view state to URL");
        self.history.write(rendered, self.options.write);
    }

    fn commit_filters(&mut self, delta: FilterMap, now: Instant) {
        self.write_filters(&delta);
        self.write_int(PAGE_KEY, self.core.state.page(), DEFAULT_PAGE);
        self.schedule_write(now);
    }
}

impl<H: History> ViewStateController for SearchParamsController<H> {
    fn columns(&self) -> &ColumnSet {
        &self.core.columns
    }

    fn view_state(&self) -> &ViewState {
        &self.core.state
    }

    fn page_count(&self) -> Option<u64> {
        self.total
            .map(|total| crate::model::query::page_count(total, self.core.state.per_page()))
    }

    fn on_pagination_change(&mut self, page: u32, per_page: u32, now: Instant) {
        if self.core.set_pagination(page, per_page).is_none() {
            return;
        }
        self.write_int(PAGE_KEY, page, DEFAULT_PAGE);
        self.write_int(PER_PAGE_KEY, per_page, self.default_per_page);
        self.schedule_write(now);
    }

    fn on_sorting_change(&mut self, sorting: Sorting, now: Instant) {
        if !self.core.set_sorting(sorting) {
            return;
        }
        self.write_sorting();
        self.schedule_write(now);
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
        if let Some(delta) = self.core.poll_filters(now) {
            self.commit_filters(delta, now);
        }
        let fire = match &mut self.gate {
            WriteGate::Throttled(throttle) => throttle.poll(now),
            WriteGate::Debounced(debouncer) => debouncer.poll(now).is_some(),
        };
        if fire {
            self.write_location();
        }
    }

    fn flush(&mut self, now: Instant) {
        if let Some(delta) = self.core.flush_filters() {
            self.write_filters(&delta);
            self.write_int(PAGE_KEY, self.core.state.page(), DEFAULT_PAGE);
            self.dirty = true;
        }
        match &mut self.gate {
            WriteGate::Throttled(throttle) => {
                throttle.flush(now);
            }
            WriteGate::Debounced(debouncer) => debouncer.cancel(),
        }
        self.write_location();
    }

    fn has_pending(&self) -> bool {
        self.core.filters_pending() || self.dirty
    }
}

#[cfg(test)]
#[path = "search_params_tests.rs"]
mod tests;
