//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod column;
pub mod error;
pub mod query;
pub mod view_state;

// Re-export for convenience
pub use column::{ColumnDef, ColumnId, ColumnSet};
pub use error::{AppError, ColumnError, FetchError};
pub use query::{PageResult, QueryKey, QueryParams};
pub use view_state::{
    ColumnFilter, ColumnVisibility, FilterMap, FilterValue, InitialState, Pagination,
    RowSelection, SortEntry, Sorting, ViewState, DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
