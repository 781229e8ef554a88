//! Table view-state synchronizer (tablesync)
//!
//! Keeps a data table's pagination, sorting, filters, column visibility and
//! row selection in sync with either component-local state (with cached,
//! keep-previous-data fetching) or the URL query string.
//!
//! Pure core: `model`, `codec`, `state`, `i18n`, `nav`. Impure shell:
//! `config`, `logging`, `cli`.

pub mod cli;
pub mod codec;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod nav;
pub mod state;
