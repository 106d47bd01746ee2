// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Store loading and route table construction.
//!
//! A store is a Lua chunk whose return value is its export surface:
//!
//! ```lua
//! -- default export only (verb-style route)
//! return function(ctx) return "hello" end
//!
//! -- default export that is a handler object
//! return { __is_handler__ = true, get = function(ctx) ... end }
//!
//! -- named exports (member-style route, one sub-route each)
//! return {
//!     create = function(ctx) ... end,
//!     remove = { delete = function(ctx) ... end },
//! }
//! ```

use mlua::{Lua, Table, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArmonError, Result};
use crate::route::{route_for, RouteEntry, RouteTable, DEFAULT_EXPORT};

/// Marker key: a returned table carrying it is itself the default export.
pub const HANDLER_MARKER: &str = "__is_handler__";

/// A loaded store and its exports.
#[derive(Debug, Clone)]
pub struct StoreModule {
    /// The store's route.
    pub route: String,
    /// Absolute path of the store file.
    pub path: PathBuf,
    /// Exports; `default` first when present, then named exports by name.
    pub exports: Vec<(String, Value)>,
}

impl StoreModule {
    /// Export names, in the same order as [`StoreModule::exports`].
    pub fn member_names(&self) -> Vec<String> {
        self.exports.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The default export, if any.
    pub fn default_export(&self) -> Option<&Value> {
        self.exports
            .iter()
            .find(|(name, _)| name == DEFAULT_EXPORT)
            .map(|(_, value)| value)
    }

    /// Named exports (everything except `default`).
    pub fn named_exports(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.exports
            .iter()
            .filter(|(name, _)| name != DEFAULT_EXPORT)
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Output of [`build`]: the route table plus the loaded modules behind it.
#[derive(Debug, Clone, Default)]
pub struct BuiltStores {
    /// Routes and export names.
    pub table: RouteTable,
    /// Loaded modules, one per route, in table order.
    pub modules: Vec<StoreModule>,
}

/// Loads every store file and builds the route table.
///
/// Each file is evaluated exactly once in `lua`. A later file normalizing to
/// an existing route replaces the earlier one.
pub fn build(lua: &Lua, root: &Path, files: &[PathBuf]) -> Result<BuiltStores> {
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut built = BuiltStores::default();

    for file in files {
        let route = route_for(&root, file)?;
        let exports = load_exports(lua, file)?;

        let module = StoreModule {
            route: route.clone(),
            path: file.clone(),
            exports,
        };

        if built.table.insert(RouteEntry::new(route.clone(), module.member_names())) {
            tracing::warn!("Route {} defined twice, using {}", route, file.display());
            if let Some(existing) = built.modules.iter_mut().find(|m| m.route == route) {
                *existing = module;
            }
        } else {
            built.modules.push(module);
        }
    }

    Ok(built)
}

/// Evaluates a store file and collects its exports.
pub fn load_exports(lua: &Lua, path: &Path) -> Result<Vec<(String, Value)>> {
    let source = fs::read_to_string(path)?;
    let value: Value = lua
        .load(&source)
        .set_name(path.to_string_lossy())
        .eval()
        .map_err(|source| ArmonError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Nil => {
            tracing::warn!("Store {} returned nothing, no routes will be mounted", path.display());
            Ok(Vec::new())
        }
        Value::Function(_) => Ok(vec![(DEFAULT_EXPORT.to_string(), value)]),
        Value::Table(table) => table_exports(table, path),
        other => Err(ArmonError::InvalidStore {
            path: path.to_path_buf(),
            message: format!("store returned a {}, expected a function or a table", other.type_name()),
        }),
    }
}

fn table_exports(table: Table, path: &Path) -> Result<Vec<(String, Value)>> {
    if table.get::<bool>(HANDLER_MARKER).unwrap_or(false) {
        return Ok(vec![(DEFAULT_EXPORT.to_string(), Value::Table(table))]);
    }

    let mut default = None;
    let mut named = Vec::new();
    for pair in table.pairs::<Value, Value>() {
        let (key, value) = pair.map_err(|source| ArmonError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let Value::String(key) = key else {
            continue;
        };
        let key = key.to_string_lossy();
        match key.as_str() {
            HANDLER_MARKER => {}
            DEFAULT_EXPORT => default = Some(value),
            _ => named.push((key, value)),
        }
    }

    named.sort_by(|a, b| a.0.cmp(&b.0));

    let mut exports = Vec::with_capacity(named.len() + 1);
    if let Some(value) = default {
        exports.push((DEFAULT_EXPORT.to_string(), value));
    }
    exports.extend(named);
    Ok(exports)
}
