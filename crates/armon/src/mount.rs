// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route mounter: binds adapted handlers to URL paths.
//!
//! Verb-style stores mount their default export at the bare route.
//! Member-style stores mount each named export at `route/member`, each with
//! its own independently adapted handler.

use matchit::Router as MatchitRouter;
use mlua::Value;

use crate::dispatch::StoreHandler;
use crate::route::{RouteEntry, RouteStyle, DEFAULT_EXPORT};
use crate::store::{BuiltStores, StoreModule};

/// One mounted handler.
#[derive(Debug, Clone)]
pub struct Mount {
    /// URL path the handler is mounted at.
    pub path: String,
    /// Route of the store that owns it.
    pub route: String,
    /// The adapted handler.
    pub handler: StoreHandler,
}

/// Path matcher over all mounted handlers.
pub struct MountTable {
    matcher: MatchitRouter<usize>,
    mounts: Vec<Mount>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountTable")
            .field("mounts", &self.mounts)
            .finish_non_exhaustive()
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self {
            matcher: MatchitRouter::new(),
            mounts: Vec::new(),
        }
    }
}

impl MountTable {
    /// Adapts and mounts every loaded store.
    ///
    /// An export that cannot be adapted is logged and left unmounted; the
    /// rest of the store and every other store still mount.
    pub fn mount(built: &BuiltStores) -> Self {
        let mut mounts: Vec<Mount> = Vec::new();

        for module in &built.modules {
            for mount in Self::mounts_for(module) {
                match mounts.iter_mut().find(|m| m.path == mount.path) {
                    Some(existing) => {
                        tracing::warn!("Path {} mounted twice, last one wins", mount.path);
                        *existing = mount;
                    }
                    None => mounts.push(mount),
                }
            }
        }

        let mut matcher = MatchitRouter::new();
        for (index, mount) in mounts.iter().enumerate() {
            if let Err(e) = matcher.insert(escape_pattern(&mount.path), index) {
                tracing::warn!("Could not mount {}: {}", mount.path, e);
            }
        }

        for mount in &mounts {
            tracing::debug!("Mounted {} ({})", mount.path, mount.handler.export());
        }

        Self { matcher, mounts }
    }

    fn mounts_for(module: &StoreModule) -> Vec<Mount> {
        let entry = RouteEntry::new(module.route.clone(), module.member_names());

        match entry.style() {
            RouteStyle::Verb => match module.default_export() {
                Some(value) => Self::adapted(module, module.route.clone(), DEFAULT_EXPORT, value)
                    .into_iter()
                    .collect(),
                None => {
                    tracing::warn!("Store {} has no exports, nothing mounted", module.route);
                    Vec::new()
                }
            },
            RouteStyle::Member => module
                .named_exports()
                .filter_map(|(name, value)| {
                    Self::adapted(module, format!("{}/{}", module.route, name), name, value)
                })
                .collect(),
        }
    }

    fn adapted(module: &StoreModule, path: String, export: &str, value: &Value) -> Option<Mount> {
        match StoreHandler::adapt(value.clone(), export, &module.path) {
            Ok(handler) => Some(Mount {
                path,
                route: module.route.clone(),
                handler,
            }),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path, e);
                None
            }
        }
    }

    /// Finds the handler mounted at `path`. A trailing slash is ignored.
    pub fn match_url(&self, path: &str) -> Option<&Mount> {
        let normalized = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        self.matcher
            .at(normalized)
            .ok()
            .and_then(|matched| self.mounts.get(*matched.value))
    }

    /// All mounts, in mount order.
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// Number of mounted paths.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Returns true if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Escapes matchit's parameter syntax so every path matches literally.
fn escape_pattern(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HandlerShape;
    use crate::locator::locate;
    use crate::store::build;
    use mlua::Lua;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, source: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn mount_dir(lua: &Lua, root: &Path) -> MountTable {
        let files = locate(root).unwrap();
        let built = build(lua, root, &files).unwrap();
        MountTable::mount(&built)
    }

    #[test]
    fn test_verb_style_mounts_bare_route() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Users/store.lua", "return function(ctx) return 'u' end");

        let lua = Lua::new();
        let table = mount_dir(&lua, dir.path());
        let paths: Vec<_> = table.mounts().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/Users"]);
        assert!(table.match_url("/Users").is_some());
        assert!(table.match_url("/Users/").is_some());
        assert!(table.match_url("/Users/create").is_none());
    }

    #[test]
    fn test_member_style_mounts_each_member() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Todos/store.lua",
            r#"return {
                create = function(ctx) return 'c' end,
                remove = { delete = function(ctx) return 'r' end },
            }"#,
        );

        let lua = Lua::new();
        let table = mount_dir(&lua, dir.path());
        let paths: Vec<_> = table.mounts().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/Todos/create", "/Todos/remove"]);
        assert!(table.match_url("/Todos").is_none());

        let remove = table.match_url("/Todos/remove").unwrap();
        assert!(matches!(remove.handler.shape(), HandlerShape::Instance(_)));
        assert_eq!(remove.route, "/Todos");
    }

    #[test]
    fn test_default_alongside_members_is_not_mounted() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Todos/store.lua",
            "return { default = function() end, list = function() end }",
        );

        let lua = Lua::new();
        let table = mount_dir(&lua, dir.path());
        assert_eq!(table.len(), 1);
        assert!(table.match_url("/Todos/list").is_some());
        assert!(table.match_url("/Todos").is_none());
    }

    #[test]
    fn test_empty_store_mounts_nothing() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Users/store.lua", "return nil");

        let lua = Lua::new();
        assert!(mount_dir(&lua, dir.path()).is_empty());
    }

    #[test]
    fn test_unusable_export_is_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Users/store.lua", "return function(ctx) return 'u' end");
        write(
            dir.path(),
            "Todos/store.lua",
            "return { VERSION = 2, create = function(ctx) return 'c' end }",
        );

        let lua = Lua::new();
        let table = mount_dir(&lua, dir.path());
        let paths: Vec<_> = table.mounts().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/Todos/create", "/Users"]);
        assert!(table.match_url("/Todos/VERSION").is_none());
    }

    #[test]
    fn test_failing_constructor_only_skips_its_export() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Todos/store.lua",
            r#"return {
                broken = { new = function() error("no db") end },
                list = function(ctx) return 'l' end,
            }"#,
        );

        let lua = Lua::new();
        let table = mount_dir(&lua, dir.path());
        assert_eq!(table.len(), 1);
        assert!(table.match_url("/Todos/list").is_some());
    }

    #[test]
    fn test_literal_braces_in_path() {
        assert_eq!(escape_pattern("/A/{b}"), "/A/{{b}}");
    }
}
