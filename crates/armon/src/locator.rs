// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Store discovery.
//!
//! Walks the server root depth-first and returns every handler file that
//! follows the folder-as-namespace convention:
//!
//! ```text
//! server/
//!   Users/
//!     store.lua          -> found
//!     Admin/
//!       Store.lua        -> found (name match is case-insensitive)
//!     helpers/
//!       store.lua        -> skipped, lowercase folder
//!   node_modules/        -> never entered
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ArmonError, Result};

/// Reserved handler filename. Matched case-insensitively.
pub const HANDLER_FILE: &str = "store.lua";

/// Directory names that are never entered.
pub const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "dist", "target"];

/// Returns the absolute paths of all handler files under `root`, in
/// depth-first order. Entries within a directory are visited by name.
///
/// # Errors
///
/// - [`ArmonError::InvalidConfig`] if `root` is empty.
/// - [`ArmonError::NotFound`] if `root` cannot be stat'd.
/// - [`ArmonError::Io`] for any other traversal failure.
pub fn locate(root: &Path) -> Result<Vec<PathBuf>> {
    if root.as_os_str().is_empty() {
        return Err(ArmonError::InvalidConfig(
            "no server files directory configured".to_string(),
        ));
    }

    let root = match fs::canonicalize(root) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ArmonError::NotFound(root.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry.file_name().to_str().is_some_and(accepts_dir)
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(&root, e))?;
        if entry.file_type().is_file() && is_handler_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

fn walk_error(root: &Path, err: walkdir::Error) -> ArmonError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => ArmonError::NotFound(path),
        _ => ArmonError::Io(err.into()),
    }
}

/// Namespace folders must start with an uppercase letter.
pub fn accepts_dir(name: &str) -> bool {
    if IGNORED_DIRS.contains(&name) {
        return false;
    }
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Only the reserved handler filename is routable.
pub fn accepts_file(name: &str) -> bool {
    name.eq_ignore_ascii_case(HANDLER_FILE)
}

fn is_handler_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(accepts_file)
}
