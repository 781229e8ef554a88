//! Command-line driver.
//!
//! Applies a batch of table operations to a query string through a
//! search-params controller backed by [`MemoryHistory`], then renders the
//! resulting location. Kept in the library so the binary stays a thin shell.

use std::time::Instant;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::model::column::{ColumnId, ColumnSet};
use crate::model::error::AppError;
use crate::model::view_state::{ColumnFilter, FilterValue, InitialState, SortEntry};
use crate::state::controller::{initialize_with, Mode, TableController, ViewStateController};
use crate::state::history::MemoryHistory;

/// Controller type the driver runs. Rows are never fetched.
pub type CliController = TableController<(), MemoryHistory>;

/// `--filter col=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    /// Column id.
    pub column: String,
    /// Raw value; comma-separated for option-backed columns.
    pub value: String,
}

/// Operations requested on the command line, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operations {
    /// New page.
    pub page: Option<u32>,
    /// New page size.
    pub per_page: Option<u32>,
    /// New sort order (replaces the current one when non-empty).
    pub sort: Vec<SortEntry>,
    /// Drop the current sort order.
    pub clear_sort: bool,
    /// Filters to set.
    pub filters: Vec<FilterArg>,
    /// Filters to remove.
    pub clear_filters: Vec<String>,
}

/// Parse `col` or `col:asc` / `col:desc`.
pub fn parse_sort_arg(raw: &str) -> Result<SortEntry, String> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, direction)) => (column, direction),
        None => (raw, "asc"),
    };
    let id = ColumnId::new(column.trim()).map_err(|e| e.to_string())?;
    match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(SortEntry::asc(id)),
        "desc" => Ok(SortEntry::desc(id)),
        other => Err(format!("unknown sort direction '{other}' (expected asc or desc)")),
    }
}

/// Parse `col=value`.
pub fn parse_filter_arg(raw: &str) -> Result<FilterArg, String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))?;
    if column.trim().is_empty() {
        return Err("column id cannot be empty".to_string());
    }
    Ok(FilterArg {
        column: column.trim().to_string(),
        value: value.to_string(),
    })
}

fn filterable_id(columns: &ColumnSet, raw: &str) -> Result<ColumnId, AppError> {
    match columns.get(raw) {
        Some(column) if column.is_filterable() => Ok(column.id().clone()),
        Some(_) => Err(AppError::InvalidArgument {
            arg: raw.to_string(),
            reason: "column is not filterable".to_string(),
        }),
        None => Err(AppError::InvalidArgument {
            arg: raw.to_string(),
            reason: "unknown column".to_string(),
        }),
    }
}

/// Next UI filter list after applying `ops` to `current`.
fn next_filters(
    columns: &ColumnSet,
    current: &[ColumnFilter],
    ops: &Operations,
) -> Result<Vec<ColumnFilter>, AppError> {
    let mut filters = current.to_vec();

    for arg in &ops.filters {
        let id = filterable_id(columns, &arg.column)?;
        let option_backed = columns
            .get(id.as_str())
            .is_some_and(|c| c.is_option_backed());
        let value = if option_backed {
            FilterValue::list(
                arg.value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            )
        } else {
            FilterValue::Text(arg.value.clone())
        };
        filters.retain(|f| f.id != id);
        if !value.is_empty() {
            filters.push(ColumnFilter::new(id, value));
        }
    }

    for raw in &ops.clear_filters {
        let id = filterable_id(columns, raw)?;
        filters.retain(|f| f.id != id);
    }

    Ok(filters)
}

/// Run `ops` against `query` and settle every pending write.
pub fn run(
    columns: ColumnSet,
    query: &str,
    ops: &Operations,
    config: &ResolvedConfig,
) -> Result<CliController, AppError> {
    let mode = Mode::SearchParams {
        history: MemoryHistory::new(query),
        options: config.search_params_options(),
    };
    let mut controller = initialize_with(
        columns,
        InitialState::default(),
        mode,
        &config.controller_options(),
    );
    let now = Instant::now();

    if ops.page.is_some() || ops.per_page.is_some() {
        let state = controller.view_state();
        let page = ops.page.unwrap_or(state.page());
        let per_page = ops.per_page.unwrap_or(state.per_page());
        controller.on_pagination_change(page, per_page, now);
    }

    if ops.clear_sort {
        controller.on_sorting_change(Vec::new(), now);
    }
    if !ops.sort.is_empty() {
        controller.on_sorting_change(ops.sort.clone(), now);
    }

    if !ops.filters.is_empty() || !ops.clear_filters.is_empty() {
        let filters = next_filters(
            controller.columns(),
            controller.view_state().column_filters(),
            ops,
        )?;
        controller.on_column_filters_change(filters, now);
    }

    controller.flush(now);
    debug!(has_pending = controller.has_pending(), "Operations applied");
    Ok(controller)
}

/// Rendered query string, or the full state as pretty JSON.
pub fn render(controller: &CliController, json: bool) -> Result<String, AppError> {
    let location = controller
        .as_search_params()
        .map(|c| c.location())
        .unwrap_or_default();
    if !json {
        return Ok(location);
    }
    let value = serde_json::json!({
        "location": location,
        "query": controller.query_params(),
        "table": controller.table_state(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_schema;
    use std::path::Path;

    fn columns() -> ColumnSet {
        parse_schema(
            r#"
[[columns]]
id = "status"
filterable = true
options = ["new", "read"]

[[columns]]
id = "name"
sortable = true
filterable = true

[[columns]]
id = "email"
"#,
            Path::new("schema.toml"),
        )
        .unwrap()
    }

    fn apply(query: &str, ops: Operations) -> String {
        let controller = run(columns(), query, &ops, &ResolvedConfig::default()).unwrap();
        render(&controller, false).unwrap()
    }

    #[test]
    fn parse_sort_arg_accepts_direction_suffix() {
        assert_eq!(
            parse_sort_arg("name").unwrap(),
            SortEntry::asc(ColumnId::new("name").unwrap())
        );
        assert_eq!(
            parse_sort_arg("name:DESC").unwrap(),
            SortEntry::desc(ColumnId::new("name").unwrap())
        );
        assert!(parse_sort_arg("name:up").is_err());
        assert!(parse_sort_arg(":desc").is_err());
    }

    #[test]
    fn parse_filter_arg_splits_on_first_equals() {
        let arg = parse_filter_arg("name=a=b").unwrap();
        assert_eq!(arg.column, "name");
        assert_eq!(arg.value, "a=b");
        assert!(parse_filter_arg("name").is_err());
        assert!(parse_filter_arg("=x").is_err());
    }

    #[test]
    fn narrowing_an_option_filter_resets_page() {
        let ops = Operations {
            filters: vec![parse_filter_arg("status=new").unwrap()],
            ..Default::default()
        };
        assert_eq!(apply("?page=2&status=new,read", ops), "?page=1&status=new");
    }

    #[test]
    fn clearing_a_filter_removes_parameter() {
        let ops = Operations {
            clear_filters: vec!["name".into()],
            ..Default::default()
        };
        assert_eq!(apply("?name=ann&page=3", ops), "?page=1");
    }

    #[test]
    fn no_operations_leave_query_untouched() {
        assert_eq!(
            apply("?page=2&status=new,read", Operations::default()),
            "?page=2&status=new,read"
        );
    }

    #[test]
    fn pagination_and_sort_are_written() {
        let ops = Operations {
            page: Some(4),
            sort: vec![parse_sort_arg("name:desc").unwrap()],
            ..Default::default()
        };
        insta::assert_snapshot!(
            apply("", ops),
            @"?page=4&perPage=10&sort=%5B%7B%22id%22%3A%22name%22%2C%22desc%22%3Atrue%7D%5D"
        );
    }

    #[test]
    fn unknown_or_unfilterable_columns_are_rejected() {
        for column in ["ghost", "email"] {
            let ops = Operations {
                filters: vec![FilterArg {
                    column: column.into(),
                    value: "x".into(),
                }],
                ..Default::default()
            };
            let err = run(columns(), "", &ops, &ResolvedConfig::default()).err();
            assert!(
                matches!(err, Some(AppError::InvalidArgument { .. })),
                "{column} should be rejected"
            );
        }
    }

    #[test]
    fn json_output_includes_table_state() {
        let controller = run(
            columns(),
            "?page=2&status=new",
            &Operations::default(),
            &ResolvedConfig::default(),
        )
        .unwrap();
        let out: serde_json::Value =
            serde_json::from_str(&render(&controller, true).unwrap()).unwrap();
        assert_eq!(out["location"], "?page=2&status=new");
        assert_eq!(out["table"]["pageIndex"], 1);
        assert_eq!(out["query"]["status"][0], "new");
        assert_eq!(out["table"]["manualPagination"], true);
    }
}
