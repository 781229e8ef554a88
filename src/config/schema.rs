//! Column schema file.
//!
//! ```toml
//! [[columns]]
//! id = "status"
//! filterable = true
//! options = ["new", "read"]
//!
//! [[columns]]
//! id = "name"
//! sortable = true
//! filterable = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::column::{ColumnDef, ColumnId, ColumnSet};
use crate::model::error::ColumnError;

/// Errors loading a column schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("Failed to read schema at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// The schema is not valid TOML or has the wrong shape.
    #[error("Invalid schema in {path}: {reason}")]
    ParseError {
        /// Offending path.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The columns are inconsistent (empty or duplicate ids).
    #[error(transparent)]
    Column(#[from] ColumnError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    columns: Vec<ColumnEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnEntry {
    id: String,
    #[serde(default)]
    sortable: bool,
    #[serde(default)]
    filterable: bool,
    #[serde(default = "default_hideable")]
    hideable: bool,
    #[serde(default)]
    options: Option<Vec<String>>,
}

fn default_hideable() -> bool {
    true
}

impl ColumnEntry {
    fn into_def(self) -> Result<ColumnDef, ColumnError> {
        let mut def = ColumnDef::new(ColumnId::new(self.id)?);
        if self.sortable {
            def = def.sortable();
        }
        if self.filterable {
            def = def.filterable();
        }
        if !self.hideable {
            def = def.not_hideable();
        }
        if let Some(options) = self.options {
            def = def.with_options(options);
        }
        Ok(def)
    }
}

/// Parse a schema from TOML text. `path` is only used in error messages.
pub fn parse_schema(contents: &str, path: &Path) -> Result<ColumnSet, SchemaError> {
    let file: SchemaFile = toml::from_str(contents).map_err(|e| SchemaError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let defs = file
        .columns
        .into_iter()
        .map(ColumnEntry::into_def)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnSet::new(defs)?)
}

/// Read and parse a schema file.
pub fn load_schema(path: &Path) -> Result<ColumnSet, SchemaError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SchemaError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_schema(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<ColumnSet, SchemaError> {
        parse_schema(toml, Path::new("schema.toml"))
    }

    #[test]
    fn parses_columns_in_order() {
        let columns = parse(
            r#"
[[columns]]
id = "status"
filterable = true
options = ["new", "read"]

[[columns]]
id = "name"
sortable = true
filterable = true
hideable = false
"#,
        )
        .unwrap();

        let ids: Vec<&str> = columns.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["status", "name"]);
        assert!(columns.get("status").unwrap().is_option_backed());
        assert!(!columns.is_sortable("status"));
        assert!(columns.is_sortable("name"));
        assert!(!columns.is_hideable("name"));
        assert!(columns.is_hideable("status"));
    }

    #[test]
    fn empty_schema_is_allowed() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = parse("[[columns]]\nid = \"a\"\n[[columns]]\nid = \"a\"\n").unwrap_err();
        assert!(matches!(err, SchemaError::Column(ColumnError::DuplicateId(_))));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = parse("[[columns]]\nid = \"  \"\n").unwrap_err();
        assert_eq!(err, SchemaError::Column(ColumnError::EmptyId));
    }

    #[test]
    fn filterable_page_column_is_rejected() {
        let err = parse("[[columns]]\nid = \"page\"\nfilterable = true\n").unwrap_err();
        assert_eq!(
            err,
            SchemaError::Column(ColumnError::ReservedId(ColumnId::new("page").unwrap()))
        );
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = parse("[[columns]]\nid = \"a\"\nwidth = 3\n").unwrap_err();
        assert!(matches!(err, SchemaError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_schema(Path::new("/nonexistent/tablesync/schema.toml")).unwrap_err();
        assert!(matches!(err, SchemaError::ReadError { .. }));
    }
}
