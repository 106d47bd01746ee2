// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Writes generated client modules to the client directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{emit_module, plan, Endpoint};
use crate::error::{ArmonError, Result};
use crate::route::RouteTable;

/// File name of the shared networking helper.
pub const HELPER_FILE: &str = "utils.js";

/// Contents written to [`HELPER_FILE`] the first time generation runs.
pub const UTILS_TEMPLATE: &str = include_str!("../../templates/utils.js");

/// What a generation run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Module files written, in namespace order.
    pub files: Vec<PathBuf>,
    /// True if `utils.js` did not exist and was created.
    pub helper_created: bool,
}

/// Generates one `<Namespace>.js` per namespace under `client_dir`.
///
/// The directory is created if missing. `utils.js` is written only when it
/// does not exist yet; module files are always overwritten. Files for
/// namespaces that no longer exist are left in place.
pub fn generate(table: &RouteTable, client_dir: &Path, endpoint: &Endpoint) -> Result<GenerateReport> {
    fs::create_dir_all(client_dir).map_err(|source| write_error(client_dir, source))?;

    let mut report = GenerateReport::default();

    let helper = client_dir.join(HELPER_FILE);
    if !helper.exists() {
        fs::write(&helper, UTILS_TEMPLATE).map_err(|source| write_error(&helper, source))?;
        tracing::info!("Created {}", helper.display());
        report.helper_created = true;
    }

    for module in plan(table) {
        let path = client_dir.join(&module.file_name);
        fs::write(&path, emit_module(&module, endpoint))
            .map_err(|source| write_error(&path, source))?;
        tracing::info!("Wrote {} ({} operations)", path.display(), module.operations.len());
        report.files.push(path);
    }

    Ok(report)
}

fn write_error(path: &Path, source: io::Error) -> ArmonError {
    ArmonError::Write {
        path: path.to_path_buf(),
        source,
    }
}
