// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Rebuilds the route snapshot and regenerates client modules.

use armon::{generate, rebuild, GenerateReport};

use super::http::AppState;
use crate::config::Config;

/// Result of a successful rebuild.
#[derive(Debug)]
pub struct ReloadOutcome {
    /// Number of routes in the new table.
    pub routes: usize,
    /// Number of mounted paths.
    pub mounts: usize,
    /// Generator result; `None` if writing clients failed.
    pub report: Option<GenerateReport>,
}

/// Rebuilds from the server root, publishes the new snapshot and
/// regenerates the client modules.
///
/// A failed rebuild leaves the previously published snapshot in place. A
/// failed client write is logged and does not undo the published routes.
pub fn reload(config: &Config, state: &AppState) -> armon::Result<ReloadOutcome> {
    let snapshot = rebuild(&config.server_dir())?;
    let routes = snapshot.table().len();
    let mounts = snapshot.mounts().len();

    for mount in snapshot.mounts().mounts() {
        tracing::info!("Mounted {} -> {}", mount.path, mount.route);
    }

    state.publish(snapshot);

    let published = state.current();
    let report = match generate(published.table(), &config.client_dir(), &config.server_endpoint()) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::error!("Client generation failed: {}", e);
            None
        }
    };

    Ok(ReloadOutcome {
        routes,
        mounts,
        report,
    })
}
