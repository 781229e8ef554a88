//! Column identifiers and column definitions with smart constructors.
//!
//! A `ColumnSet` is the single source of truth for which columns may be
//! sorted, filtered or hidden. Every other layer validates against it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::parsers::{PAGE_KEY, PER_PAGE_KEY, SORT_KEY};
use crate::model::error::ColumnError;

/// Identifier of a table column (e.g. "status").
///
/// Never empty. Doubles as the query parameter name for the column's filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnId(String);

impl ColumnId {
    /// Smart constructor: validates non-empty, trimmed id.
    pub fn new(raw: impl Into<String>) -> Result<Self, ColumnError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(ColumnError::EmptyId);
        }
        Ok(Self(s))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ColumnId {
    type Error = ColumnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnId> for String {
    fn from(id: ColumnId) -> Self {
        id.0
    }
}

impl AsRef<str> for ColumnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Definition of a single column.
///
/// Built with a small builder API:
///
/// ```
/// use tablesync::model::{ColumnDef, ColumnId};
///
/// let status = ColumnDef::new(ColumnId::new("status").unwrap())
///     .filterable()
///     .with_options(["new", "read"]);
/// assert!(status.is_option_backed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    id: ColumnId,
    sortable: bool,
    filterable: bool,
    hideable: bool,
    options: Option<Vec<String>>,
}

impl ColumnDef {
    /// New column: not sortable, not filterable, hideable.
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            sortable: false,
            filterable: false,
            hideable: true,
            options: None,
        }
    }

    /// Mark the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the column filterable.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Forbid hiding the column.
    pub fn not_hideable(mut self) -> Self {
        self.hideable = false;
        self
    }

    /// Declare a finite option set. Filters on such columns are lists.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Column id.
    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    /// Whether the column can be sorted.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Whether the column can be filtered.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Whether the column can be hidden.
    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    /// Declared option set, if any.
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    /// True when the column declares a finite option set.
    pub fn is_option_backed(&self) -> bool {
        self.options.is_some()
    }

    /// True when `value` is one of the declared options.
    /// Columns without an option set accept everything.
    pub fn accepts_option(&self, value: &str) -> bool {
        match &self.options {
            Some(options) => options.iter().any(|o| o == value),
            None => true,
        }
    }
}

/// Query keys owned by pagination and sorting.
const RESERVED_KEYS: [&str; 3] = [PAGE_KEY, PER_PAGE_KEY, SORT_KEY];

/// Ordered set of column definitions with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnDef>,
}

impl ColumnSet {
    /// Build a column set, rejecting duplicate ids and filterable columns
    /// named after a view-state query parameter.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, ColumnError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.id == column.id) {
                return Err(ColumnError::DuplicateId(column.id.clone()));
            }
            if column.filterable && RESERVED_KEYS.contains(&column.id.as_str()) {
                return Err(ColumnError::ReservedId(column.id.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Look up a column by id.
    pub fn get(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id.as_str() == id)
    }

    /// Iterate columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    /// Iterate filterable columns in declaration order.
    pub fn filterable(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.filterable)
    }

    /// Whether `id` names a sortable column.
    pub fn is_sortable(&self, id: &str) -> bool {
        self.get(id).is_some_and(ColumnDef::is_sortable)
    }

    /// Whether `id` names a filterable column.
    pub fn is_filterable(&self, id: &str) -> bool {
        self.get(id).is_some_and(ColumnDef::is_filterable)
    }

    /// Whether `id` names a hideable column.
    pub fn is_hideable(&self, id: &str) -> bool {
        self.get(id).is_some_and(ColumnDef::is_hideable)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ColumnId {
        ColumnId::new(s).expect("valid column id")
    }

    #[test]
    fn column_id_accepts_simple_name() {
        assert!(ColumnId::new("status").is_ok());
    }

    #[test]
    fn column_id_rejects_empty_string() {
        assert_eq!(ColumnId::new(""), Err(ColumnError::EmptyId));
    }

    #[test]
    fn column_id_rejects_whitespace_only() {
        assert_eq!(ColumnId::new("   "), Err(ColumnError::EmptyId));
    }

    #[test]
    fn column_id_display_matches_raw() {
        assert_eq!(id("createdAt").to_string(), "createdAt");
    }

    #[test]
    fn column_id_deserialize_rejects_empty() {
        let result: Result<ColumnId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err(), "Empty id must not deserialize");
    }

    #[test]
    fn new_column_defaults() {
        let col = ColumnDef::new(id("name"));
        assert!(!col.is_sortable());
        assert!(!col.is_filterable());
        assert!(col.is_hideable());
        assert!(!col.is_option_backed());
    }

    #[test]
    fn accepts_option_checks_declared_set() {
        let col = ColumnDef::new(id("status")).with_options(["new", "read"]);
        assert!(col.accepts_option("new"));
        assert!(!col.accepts_option("archived"));
    }

    #[test]
    fn free_text_column_accepts_any_value() {
        let col = ColumnDef::new(id("name")).filterable();
        assert!(col.accepts_option("anything, at all"));
    }

    #[test]
    fn column_set_rejects_duplicates() {
        let result = ColumnSet::new(vec![
            ColumnDef::new(id("a")),
            ColumnDef::new(id("b")),
            ColumnDef::new(id("a")),
        ]);
        assert_eq!(result, Err(ColumnError::DuplicateId(id("a"))));
    }

    #[test]
    fn column_set_rejects_filterable_reserved_ids() {
        for reserved in ["page", "perPage", "sort"] {
            let result = ColumnSet::new(vec![ColumnDef::new(id(reserved)).filterable()]);
            assert_eq!(result, Err(ColumnError::ReservedId(id(reserved))));
        }
    }

    #[test]
    fn column_set_allows_reserved_ids_without_filter() {
        let set = ColumnSet::new(vec![ColumnDef::new(id("sort")).sortable()]).unwrap();
        assert!(set.is_sortable("sort"));
    }

    #[test]
    fn column_set_flag_lookups() {
        let set = ColumnSet::new(vec![
            ColumnDef::new(id("name")).sortable().filterable(),
            ColumnDef::new(id("email")).not_hideable(),
        ])
        .unwrap();

        assert!(set.is_sortable("name"));
        assert!(set.is_filterable("name"));
        assert!(!set.is_sortable("email"));
        assert!(!set.is_hideable("email"));
        assert!(!set.is_sortable("missing"));
        assert_eq!(set.filterable().count(), 1);
        assert_eq!(set.len(), 2);
    }
}
