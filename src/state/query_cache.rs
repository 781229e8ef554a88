//! Keyed page cache with keep-previous-data semantics.
//!
//! Every request is keyed by the full [`QueryKey`]. Only the key marked
//! latest is ever displayed; a response for an older key is still cached but
//! cannot overwrite what is on screen. While the latest key has no data yet,
//! the last displayed page is served as a placeholder so the table does not
//! flash empty.

use lru::LruCache;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::model::error::FetchError;
use crate::model::query::{PageResult, QueryKey};

/// Default number of pages kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Handle for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// What happened to a resolved response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Response belongs to the latest key and is now displayed.
    Current,
    /// Response belongs to an older key; cached (if successful) but not displayed.
    Superseded,
    /// No such request is in flight.
    Unknown,
}

/// Display-ready snapshot of the cache for the latest key.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchState<'a, T> {
    /// Rows to render: the latest page, or the previous page as placeholder.
    pub data: Option<&'a PageResult<T>>,
    /// True when `data` belongs to an earlier key.
    pub is_placeholder: bool,
    /// True while a request for the latest key is in flight.
    pub is_fetching: bool,
    /// Failure of the most recent request for the latest key.
    pub error: Option<&'a FetchError>,
}

/// Page cache keyed by query key.
///
/// Least-recently-used pages are evicted past `capacity`, except the latest
/// and displayed ones.
#[derive(Debug)]
pub struct QueryCache<T> {
    capacity: usize,
    entries: LruCache<QueryKey, PageResult<T>>,
    in_flight: HashMap<RequestId, QueryKey>,
    next_request: u64,
    latest: Option<QueryKey>,
    displayed: Option<QueryKey>,
    error: Option<FetchError>,
}

impl<T> QueryCache<T> {
    /// Cache holding at most `capacity` pages (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: LruCache::unbounded(),
            in_flight: HashMap::new(),
            next_request: 0,
            latest: None,
            displayed: None,
            error: None,
        }
    }

    /// Mark `key` as the one the view wants. Returns true if it is not cached.
    pub fn set_latest(&mut self, key: QueryKey) -> bool {
        if self.latest.as_ref() != Some(&key) {
            self.error = None;
        }
        let missing = !self.entries.contains(&key);
        if !missing {
            self.entries.promote(&key);
            self.displayed = Some(key.clone());
        }
        self.latest = Some(key);
        missing
    }

    /// Key the view currently wants.
    pub fn latest(&self) -> Option<&QueryKey> {
        self.latest.as_ref()
    }

    /// Cached page for `key`.
    pub fn get(&self, key: &QueryKey) -> Option<&PageResult<T>> {
        self.entries.peek(key)
    }

    /// Start a request for `key`.
    ///
    /// Returns `None` when a request for the same key is already in flight.
    pub fn begin(&mut self, key: QueryKey) -> Option<RequestId> {
        if self.in_flight.values().any(|k| *k == key) {
            debug!(key = %key, "Request already in flight");
            return None;
        }
        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.in_flight.insert(id, key);
        Some(id)
    }

    /// Record the outcome of a request.
    pub fn resolve(&mut self, id: RequestId, result: Result<PageResult<T>, FetchError>) -> Resolution {
        let Some(key) = self.in_flight.remove(&id) else {
            return Resolution::Unknown;
        };
        let is_latest = self.latest.as_ref() == Some(&key);

        match result {
            Ok(page) => {
                self.insert(key.clone(), page);
                if is_latest {
                    self.error = None;
                    self.displayed = Some(key.clone());
                }
            }
            Err(error) => {
                warn!(key = %key, error = %error, "Table query failed");
                if is_latest {
                    self.error = Some(error);
                }
            }
        }

        if is_latest {
            Resolution::Current
        } else {
            debug!(key = %key, "Response superseded by a newer query");
            Resolution::Superseded
        }
    }

    /// Drop every cached page (placeholder data is dropped too).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.displayed = None;
    }

    /// Drop the page cached for `key`, keeping it as placeholder if displayed.
    pub fn invalidate(&mut self, key: &QueryKey) {
        if self.displayed.as_ref() == Some(key) {
            return;
        }
        self.entries.pop(key);
    }

    /// Snapshot for rendering.
    pub fn state(&self) -> FetchState<'_, T> {
        let current = self.latest.as_ref().and_then(|k| self.entries.peek(k));
        let is_fetching = self
            .latest
            .as_ref()
            .is_some_and(|k| self.in_flight.values().any(|f| f == k));

        let (data, is_placeholder) = match current {
            Some(page) => (Some(page), false),
            None => {
                let previous = self.displayed.as_ref().and_then(|k| self.entries.peek(k));
                (previous, previous.is_some())
            }
        };

        FetchState {
            data,
            is_placeholder,
            is_fetching,
            error: self.error.as_ref(),
        }
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no page is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: QueryKey, page: PageResult<T>) {
        self.entries.push(key, page);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .rev()
                .map(|(k, _)| k)
                .find(|k| Some(*k) != self.latest.as_ref() && Some(*k) != self.displayed.as_ref())
                .cloned();
            let Some(key) = victim else { break };
            debug!(key = %key, "Evicting cached page");
            self.entries.pop(&key);
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::query::QueryParams;

    fn key(page: u32) -> QueryKey {
        let params = QueryParams {
            page,
            per_page: 10,
            sort: Vec::new(),
            filters: Default::default(),
        };
        QueryKey::new("rows", &params)
    }

    fn page(rows: &[&'static str], total: u64) -> PageResult<&'static str> {
        PageResult::new(rows.to_vec(), total)
    }

    #[test]
    fn fresh_cache_has_no_data() {
        let mut cache: QueryCache<&str> = QueryCache::default();
        assert!(cache.set_latest(key(1)));
        let state = cache.state();
        assert_eq!(state.data, None);
        assert!(!state.is_placeholder);
        assert!(!state.is_fetching);
    }

    #[test]
    fn resolve_latest_displays_data() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        assert!(cache.state().is_fetching);
        assert_eq!(cache.resolve(id, Ok(page(&["a"], 1))), Resolution::Current);
        let state = cache.state();
        assert_eq!(state.data, Some(&page(&["a"], 1)));
        assert!(!state.is_placeholder);
        assert!(!state.is_fetching);
    }

    #[test]
    fn previous_page_is_placeholder_while_loading() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&["a"], 20)));

        cache.set_latest(key(2));
        cache.begin(key(2)).unwrap();
        let state = cache.state();
        assert_eq!(state.data, Some(&page(&["a"], 20)));
        assert!(state.is_placeholder);
        assert!(state.is_fetching);
    }

    #[test]
    fn stale_response_does_not_replace_display() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let slow = cache.begin(key(1)).unwrap();
        cache.set_latest(key(2));
        let fast = cache.begin(key(2)).unwrap();

        assert_eq!(cache.resolve(fast, Ok(page(&["p2"], 20))), Resolution::Current);
        assert_eq!(cache.resolve(slow, Ok(page(&["p1"], 20))), Resolution::Superseded);

        assert_eq!(cache.state().data, Some(&page(&["p2"], 20)));
        assert!(cache.get(&key(1)).is_some(), "Superseded response is still cached");
    }

    #[test]
    fn duplicate_begin_is_deduplicated() {
        let mut cache: QueryCache<&str> = QueryCache::default();
        assert!(cache.begin(key(1)).is_some());
        assert!(cache.begin(key(1)).is_none());
    }

    #[test]
    fn unknown_request_is_reported() {
        let mut cache: QueryCache<&str> = QueryCache::default();
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&[], 0)));
        assert_eq!(cache.resolve(id, Ok(page(&[], 0))), Resolution::Unknown);
    }

    #[test]
    fn error_on_latest_keeps_previous_data() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&["a"], 1)));

        cache.set_latest(key(2));
        let id = cache.begin(key(2)).unwrap();
        cache.resolve(id, Err(FetchError::new("boom")));

        let state = cache.state();
        assert_eq!(state.error, Some(&FetchError::new("boom")));
        assert!(state.is_placeholder);
        assert_eq!(state.data, Some(&page(&["a"], 1)));
    }

    #[test]
    fn cached_key_is_served_without_fetch() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&["a"], 1)));
        cache.set_latest(key(2));
        assert!(!cache.set_latest(key(1)), "Page 1 is cached");
        assert!(!cache.state().is_placeholder);
    }

    #[test]
    fn eviction_spares_displayed_page() {
        let mut cache = QueryCache::new(2);
        for n in 1..=4 {
            cache.set_latest(key(n));
            let id = cache.begin(key(n)).unwrap();
            cache.resolve(id, Ok(page(&["x"], 1)));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(4)).is_some());
        assert!(cache.get(&key(3)).is_some());
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn revisited_page_survives_eviction() {
        let mut cache = QueryCache::new(2);
        for n in [1, 2, 1, 3] {
            if cache.set_latest(key(n)) {
                let id = cache.begin(key(n)).unwrap();
                cache.resolve(id, Ok(page(&["x"], 1)));
            }
        }
        assert!(cache.get(&key(1)).is_some(), "Page 1 was promoted by revisiting");
        assert!(cache.get(&key(2)).is_none());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn clear_drops_placeholder() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&["a"], 1)));
        cache.set_latest(key(2));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.latest(), Some(&key(2)));
        let state = cache.state();
        assert_eq!(state.data, None);
        assert!(!state.is_placeholder);
    }

    #[test]
    fn invalidate_keeps_displayed_placeholder() {
        let mut cache = QueryCache::default();
        cache.set_latest(key(1));
        let id = cache.begin(key(1)).unwrap();
        cache.resolve(id, Ok(page(&["a"], 1)));
        cache.invalidate(&key(1));
        assert!(cache.get(&key(1)).is_some());
    }
}
