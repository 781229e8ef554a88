//! Column-filter delta computation.
//!
//! The table UI reports the complete new filter list on every edit. The
//! delta turns that into per-column updates: present columns carry their
//! value, columns that disappeared carry an explicit `None` so downstream
//! consumers observe the removal instead of a silent omission.

use crate::model::column::ColumnSet;
use crate::model::view_state::{ColumnFilter, FilterMap};

/// Compute the delta from `previous` to `next`.
///
/// Only filterable columns contribute. A filter with an empty value counts as
/// absent.
pub fn filter_delta(columns: &ColumnSet, previous: &[ColumnFilter], next: &[ColumnFilter]) -> FilterMap {
    let mut delta = FilterMap::new();

    for filter in next {
        if columns.is_filterable(filter.id.as_str()) && !filter.value.is_empty() {
            delta
                .entry(filter.id.clone())
                .or_insert_with(|| Some(filter.value.clone()));
        }
    }

    for filter in previous {
        if columns.is_filterable(filter.id.as_str()) && !delta.contains_key(&filter.id) {
            delta.insert(filter.id.clone(), None);
        }
    }

    delta
}

/// Fold a newer delta into an older pending one; newer entries win per column.
pub fn merge_deltas(mut older: FilterMap, newer: FilterMap) -> FilterMap {
    older.extend(newer);
    older
}

// ===== Tests =====
