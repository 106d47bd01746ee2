// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The rebuild pipeline: Locator, Builder, Adapter and Mounter run against a
//! fresh Lua state, producing an immutable [`Snapshot`].

use mlua::{Lua, Table};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{DispatchError, Result};
use crate::extensions::register_json_module;
use crate::locator::locate;
use crate::mount::MountTable;
use crate::request::RequestContext;
use crate::response::StoreResponse;
use crate::route::RouteTable;
use crate::store::build;

/// One complete, immutable generation of routes and handlers.
///
/// Every handler in the snapshot lives in the snapshot's own Lua state, so a
/// snapshot can be dropped wholesale once a newer one is published.
pub struct Snapshot {
    root: PathBuf,
    table: RouteTable,
    mounts: MountTable,
    lua: Lua,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("root", &self.root)
            .field("table", &self.table)
            .field("mounts", &self.mounts)
            .finish_non_exhaustive()
    }
}

impl Snapshot {
    /// A snapshot with no routes.
    pub fn empty() -> Self {
        Self {
            root: PathBuf::new(),
            table: RouteTable::new(),
            mounts: MountTable::default(),
            lua: Lua::new(),
        }
    }

    /// The server root this snapshot was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The mounted handlers.
    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    /// The Lua state the handlers live in.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Dispatches a request against the mounted handlers.
    ///
    /// Returns `None` if nothing is mounted at the request path.
    pub fn dispatch(
        &self,
        ctx: &RequestContext,
    ) -> Option<std::result::Result<StoreResponse, DispatchError>> {
        let mount = self.mounts.match_url(&ctx.path)?;
        Some(mount.handler.dispatch(&self.lua, ctx))
    }
}

/// Runs a full rebuild of the server tree under `root`.
///
/// Nothing is cached between rebuilds; every store is loaded again into a new
/// Lua state so edits to handler code take effect.
pub fn rebuild(root: &Path) -> Result<Snapshot> {
    let started = Instant::now();

    let files = locate(root)?;
    let root = fs::canonicalize(root)?;

    let lua = create_lua(&root)?;
    let built = build(&lua, &root, &files)?;
    let mounts = MountTable::mount(&built);

    tracing::debug!(
        "Rebuilt {} routes ({} mounts) in {:?}",
        built.table.len(),
        mounts.len(),
        started.elapsed()
    );

    Ok(Snapshot {
        root,
        table: built.table,
        mounts,
        lua,
    })
}

/// Creates the Lua state stores are loaded into.
fn create_lua(root: &Path) -> Result<Lua> {
    let lua = Lua::new();
    register_json_module(&lua)?;

    let package: Table = lua.globals().get("package")?;
    let current: String = package.get("path")?;
    let root = root.to_string_lossy().replace('\\', "/");
    package.set(
        "path",
        format!("{root}/?.lua;{root}/?/init.lua;{current}"),
    )?;

    Ok(lua)
}
