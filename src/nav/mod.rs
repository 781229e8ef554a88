//! Navigation helpers.

pub mod breadcrumbs;

pub use breadcrumbs::{breadcrumb_trail, Crumb, RouteNode};
