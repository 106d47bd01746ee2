// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Routes and the route table.
//!
//! A route is the URL path of a store, derived from where the store file sits
//! under the server root:
//!
//! | Store file                    | Route          |
//! |-------------------------------|----------------|
//! | `server/Users/store.lua`      | `/Users`       |
//! | `server/Users/Admin/store.lua`| `/Users/Admin` |
//! | `server/store.lua`            | invalid        |

use serde::Serialize;
use std::path::{Component, Path};

use crate::error::{ArmonError, Result};
use crate::locator::HANDLER_FILE;

/// Export name of a module's default export.
pub const DEFAULT_EXPORT: &str = "default";

/// Extensions stripped from route segments.
const SOURCE_EXTENSIONS: &[&str] = &["lua", "ts", "js", "mjs"];

/// Converts a store path into its route.
///
/// The root prefix and leading separator are removed before the result is
/// passed through [`normalize`].
pub fn route_for(root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let route = normalize(&joined);
    if namespace_of(&route).is_none() {
        return Err(ArmonError::InvalidRoute {
            route,
            path: file.to_path_buf(),
        });
    }
    Ok(route)
}

/// Normalizes a raw relative path into a route string.
///
/// Separators become `/`, a leading slash is ensured, and the trailing
/// handler file segment is dropped. Source extensions are stripped from every
/// remaining segment, so a folder named `Report.lua` routes as `Report`.
/// Already-normalized routes pass through unchanged.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let mut segments: Vec<&str> = unified.split('/').filter(|s| !s.is_empty()).collect();

    if segments.last().is_some_and(|last| is_handler_segment(last)) {
        segments.pop();
    }

    let segments: Vec<&str> = segments.into_iter().map(strip_source_extensions).collect();
    format!("/{}", segments.join("/"))
}

fn is_handler_segment(segment: &str) -> bool {
    let stem = HANDLER_FILE.split('.').next().unwrap_or(HANDLER_FILE);
    match segment.rsplit_once('.') {
        Some((name, ext)) => name.eq_ignore_ascii_case(stem) && is_source_extension(ext),
        None => false,
    }
}

fn is_source_extension(ext: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
}

/// Strips source extensions until none is left (`a.lua.lua` becomes `a`).
fn strip_source_extensions(mut segment: &str) -> &str {
    while let Some((name, ext)) = segment.rsplit_once('.') {
        if name.is_empty() || !is_source_extension(ext) {
            break;
        }
        segment = name;
    }
    segment
}

/// Returns the first segment of a route, the namespace that names its client class.
pub fn namespace_of(route: &str) -> Option<&str> {
    route.split('/').find(|s| !s.is_empty())
}

/// How a store is exposed over HTTP and in its generated client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// Only a default export: one endpoint, `get/post/put/delete` in the client.
    Verb,
    /// Named exports: one sub-route and one client operation per export.
    Member,
}

/// One store's route and the names it exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// The normalized route.
    pub route: String,
    /// Exported identifiers; `default` first when present, then named exports
    /// in lexical order.
    pub member_names: Vec<String>,
}

impl RouteEntry {
    /// Creates an entry for the given route and exports.
    pub fn new(route: impl Into<String>, member_names: Vec<String>) -> Self {
        Self {
            route: route.into(),
            member_names,
        }
    }

    /// Exports other than `default`.
    pub fn named_members(&self) -> impl Iterator<Item = &str> {
        self.member_names
            .iter()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_EXPORT)
    }

    /// Returns true if the store has a default export.
    pub fn has_default(&self) -> bool {
        self.member_names.iter().any(|name| name == DEFAULT_EXPORT)
    }

    /// Verb-style unless at least one named export exists.
    pub fn style(&self) -> RouteStyle {
        if self.named_members().next().is_some() {
            RouteStyle::Member
        } else {
            RouteStyle::Verb
        }
    }

    /// The namespace (first route segment).
    pub fn namespace(&self) -> &str {
        namespace_of(&self.route).unwrap_or_default()
    }
}

/// Routes in discovery order.
///
/// Rebuilt wholesale on every rebuild. Inserting a route that already exists
/// replaces the earlier entry in place.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any entry with the same route.
    ///
    /// Returns true if an earlier entry was replaced.
    pub fn insert(&mut self, entry: RouteEntry) -> bool {
        match self.entries.iter_mut().find(|e| e.route == entry.route) {
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                self.entries.push(entry);
                false
            }
        }
    }

    /// Looks up an entry by route.
    pub fn get(&self, route: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.route == route)
    }

    /// Iterates entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no routes were discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_route_for_store() {
        let root = PathBuf::from("/srv/app/server");
        let file = root.join("Users").join("store.lua");
        assert_eq!(route_for(&root, &file).unwrap(), "/Users");

        let nested = root.join("Users").join("Admin").join("Store.lua");
        assert_eq!(route_for(&root, &nested).unwrap(), "/Users/Admin");
    }

    #[test]
    fn test_root_store_is_invalid() {
        let root = PathBuf::from("/srv/app/server");
        let file = root.join("store.lua");
        assert!(matches!(
            route_for(&root, &file),
            Err(ArmonError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn test_normalize_separators_and_extension() {
        assert_eq!(normalize("Users\\store.ts"), "/Users");
        assert_eq!(normalize("Users/list.lua"), "/Users/list");
        assert_eq!(normalize("/Todos/"), "/Todos");
    }

    #[test]
    fn test_dotted_folder_route() {
        let root = PathBuf::from("/srv/app/server");
        let file = root.join("Users").join("Report.lua").join("store.lua");
        let route = route_for(&root, &file).unwrap();
        assert_eq!(route, "/Users/Report");
        assert_eq!(normalize(&route), route);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "Users/store.lua",
            "Users/Admin/STORE.LUA",
            "Store/store.lua",
            "A\\B\\store.js",
            "Users/Report.lua/store.lua",
            "Users/Report.LUA.lua/store.lua",
            "Users/Store.lua",
            "Users/.lua",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw}");
        }
    }

    #[test]
    fn test_entry_style() {
        let verb = RouteEntry::new("/Users", vec!["default".into()]);
        assert_eq!(verb.style(), RouteStyle::Verb);
        assert!(verb.has_default());

        let member = RouteEntry::new("/Todos", vec!["create".into(), "remove".into()]);
        assert_eq!(member.style(), RouteStyle::Member);
        assert_eq!(member.named_members().collect::<Vec<_>>(), vec!["create", "remove"]);

        let empty = RouteEntry::new("/Empty", vec![]);
        assert_eq!(empty.style(), RouteStyle::Verb);
    }

    #[test]
    fn test_table_overwrites_in_place() {
        let mut table = RouteTable::new();
        table.insert(RouteEntry::new("/A", vec!["default".into()]));
        table.insert(RouteEntry::new("/B", vec!["default".into()]));
        assert!(table.insert(RouteEntry::new("/A", vec!["x".into()])));

        let routes: Vec<_> = table.iter().map(|e| e.route.as_str()).collect();
        assert_eq!(routes, vec!["/A", "/B"]);
        assert_eq!(table.get("/A").unwrap().member_names, vec!["x"]);
    }
}
