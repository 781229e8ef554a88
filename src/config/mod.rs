//! Configuration module.
//!
//! Runtime settings come from `loader` (defaults, config file, environment,
//! command line). Column definitions come from a separate schema file.

pub mod loader;
pub mod schema;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
pub use schema::{load_schema, parse_schema, SchemaError};
