//! Breadcrumb trail lookup in a nested route tree.
//!
//! Paths match on whole segments: `/users` is a prefix of `/users/42` but not
//! of `/users-archive`. A trailing slash and any query string or fragment on
//! the current path are ignored.

use serde::{Deserialize, Serialize};

/// One route in the navigation config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    /// Display title.
    pub title: String,
    /// Absolute path, e.g. `/settings/profile`.
    pub path: String,
    /// Nested routes.
    #[serde(default)]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    /// Leaf route.
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Attach children.
    pub fn with_children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = children;
        self
    }
}

/// One entry of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    /// Display title.
    pub title: String,
    /// Link target.
    pub path: String,
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match depth of `route` against `current`: `Some(len)` if every route
/// segment equals the corresponding current segment.
fn prefix_len(route: &[&str], current: &[&str]) -> Option<usize> {
    (route.len() <= current.len() && route.iter().zip(current).all(|(a, b)| a == b))
        .then_some(route.len())
}

/// Best match below `nodes`: (matched segment count, trail from these nodes down).
fn search<'a>(nodes: &'a [RouteNode], current: &[&str]) -> Option<(usize, Vec<&'a RouteNode>)> {
    let mut best: Option<(usize, Vec<&'a RouteNode>)> = None;
    for node in nodes {
        let own = prefix_len(&segments(&node.path), current);
        let below = search(&node.children, current);

        let candidate = match (own, below) {
            (Some(own), Some((depth, mut trail))) if depth >= own => {
                trail.insert(0, node);
                Some((depth, trail))
            }
            (Some(depth), _) => Some((depth, vec![node])),
            (None, _) => None,
        };

        if let Some((depth, trail)) = candidate {
            if best.as_ref().map_or(true, |(d, _)| depth > *d) {
                best = Some((depth, trail));
            }
        }
    }
    best
}

/// Root-to-leaf trail of routes matching `current_path`.
///
/// The deepest match wins; among equally deep matches the first in tree
/// order wins. Empty when no route matches.
pub fn breadcrumb_trail(routes: &[RouteNode], current_path: &str) -> Vec<Crumb> {
    let current = segments(current_path);
    search(routes, &current)
        .map(|(_, trail)| {
            trail
                .into_iter()
                .map(|node| Crumb {
                    title: node.title.clone(),
                    path: node.path.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> Vec<RouteNode> {
        vec![
            RouteNode::new("Home", "/"),
            RouteNode::new("Users", "/users").with_children(vec![
                RouteNode::new("New user", "/users/new"),
                RouteNode::new("Roles", "/users/roles")
                    .with_children(vec![RouteNode::new("Audit", "/users/roles/audit")]),
            ]),
            RouteNode::new("Settings", "/settings").with_children(vec![RouteNode::new(
                "Profile",
                "/settings/profile",
            )]),
        ]
    }

    fn titles(trail: &[Crumb]) -> Vec<&str> {
        trail.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn exact_nested_match() {
        let trail = breadcrumb_trail(&routes(), "/users/roles/audit");
        assert_eq!(titles(&trail), vec!["Users", "Roles", "Audit"]);
        assert_eq!(trail[2].path, "/users/roles/audit");
    }

    #[test]
    fn deepest_prefix_match_for_unlisted_child() {
        let trail = breadcrumb_trail(&routes(), "/users/42/edit");
        assert_eq!(titles(&trail), vec!["Users"]);
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        let trail = breadcrumb_trail(&routes(), "/settings/profile/?tab=security#top");
        assert_eq!(titles(&trail), vec!["Settings", "Profile"]);
    }

    #[test]
    fn prefix_must_end_on_segment_boundary() {
        let trail = breadcrumb_trail(&routes(), "/users-archive");
        assert_eq!(titles(&trail), vec!["Home"]);
    }

    #[test]
    fn root_matches_itself() {
        assert_eq!(titles(&breadcrumb_trail(&routes(), "/")), vec!["Home"]);
    }

    #[test]
    fn no_match_is_empty() {
        let routes = vec![RouteNode::new("Users", "/users")];
        assert!(breadcrumb_trail(&routes, "/billing").is_empty());
        assert!(breadcrumb_trail(&[], "/users").is_empty());
    }

    #[test]
    fn deserializes_from_json_config() {
        let routes: Vec<RouteNode> = serde_json::from_str(
            r#"[{"title":"Docs","path":"/docs","children":[{"title":"API","path":"/docs/api"}]}]"#,
        )
        .unwrap();
        assert_eq!(titles(&breadcrumb_trail(&routes, "/docs/api")), vec!["Docs", "API"]);
    }
}
