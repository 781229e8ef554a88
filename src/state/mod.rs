//! View-state controllers (pure).
//!
//! Every transition takes the current `Instant` explicitly; nothing here owns
//! a timer or performs I/O beyond the caller-supplied query and history.

pub mod controller;
pub mod debounce;
pub mod filter_diff;
pub mod history;
pub mod local;
pub mod query_cache;
pub mod search_params;
pub mod table_state;

mod view_core;

// Re-export for convenience
pub use controller::{
    initialize, initialize_with, ControllerOptions, Mode, TableController, ViewStateController,
};
pub use debounce::{Debouncer, Throttle, DEFAULT_FILTER_DEBOUNCE_MS};
pub use filter_diff::{filter_delta, merge_deltas};
pub use history::{History, HistoryEntry, HistoryMode, MemoryHistory, WriteOptions};
pub use local::{LocalController, QueryFn, TableQuery};
pub use query_cache::{FetchState, QueryCache, RequestId, Resolution};
pub use search_params::{SearchParamsController, SearchParamsOptions, DEFAULT_THROTTLE_MS};
pub use table_state::TableState;
