//! tablesync - Entry Point

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use tablesync::cli::{parse_filter_arg, parse_sort_arg, FilterArg, Operations};
use tablesync::model::{AppError, SortEntry};
use tablesync::state::HistoryMode;

/// Apply table operations to a URL query string
#[derive(Parser, Debug)]
#[command(name = "tablesync")]
#[command(version)]
#[command(about = "Apply table view-state changes to a URL query string")]
pub struct Args {
    /// Current query string, e.g. "?page=2&status=new,read"
    pub query: Option<String>,

    /// Column schema (TOML, one [[columns]] table per column)
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Go to page (must be positive)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Set page size (must be positive)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_page: Option<u32>,

    /// Sort by column, optionally ":desc" (repeatable, in priority order)
    #[arg(long, value_parser = parse_sort_arg)]
    pub sort: Vec<SortEntry>,

    /// Remove the sort order
    #[arg(long)]
    pub clear_sort: bool,

    /// Set a filter, COLUMN=VALUE (comma-separated for option columns)
    #[arg(long, value_parser = parse_filter_arg)]
    pub filter: Vec<FilterArg>,

    /// Remove a column's filter
    #[arg(long)]
    pub clear_filter: Vec<String>,

    /// Omit parameters equal to their default
    #[arg(long)]
    pub clear_on_default: bool,

    /// Push a new history entry or replace the current one
    #[arg(long, value_parser = ["push", "replace"])]
    pub history: Option<String>,

    /// Print the full state as JSON instead of the query string
    #[arg(long)]
    pub json: bool,
}

impl Args {
    fn operations(&self) -> Operations {
        Operations {
            page: self.page,
            per_page: self.per_page,
            sort: self.sort.clone(),
            clear_sort: self.clear_sort,
            filters: self.filter.clone(),
            clear_filters: self.clear_filter.clone(),
        }
    }

    fn history_override(&self) -> Option<HistoryMode> {
        match self.history.as_deref() {
            Some("push") => Some(HistoryMode::Push),
            Some("replace") => Some(HistoryMode::Replace),
            _ => None,
        }
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = tablesync::config::load_config_with_precedence(args.config.clone())?;
        let merged = tablesync::config::merge_config(config_file);
        let with_env = tablesync::config::apply_env_overrides(merged);

        // Flags only override when explicitly set
        let clear_override = args.clear_on_default.then_some(true);
        tablesync::config::apply_cli_overrides(with_env, args.history_override(), clear_override)
    };

    tablesync::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let columns = tablesync::config::load_schema(&args.schema)?;
    let query = args.query.clone().unwrap_or_default();
    let controller = tablesync::cli::run(columns, &query, &args.operations(), &config)?;

    println!("{}", tablesync::cli::render(&controller, args.json)?);

    Ok(())
}
