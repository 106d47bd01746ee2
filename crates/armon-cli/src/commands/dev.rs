// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development server command with live rebuilds.

use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use armon::Snapshot;

use crate::config::Config;
use crate::server::{create_server, reload, AppState};
use crate::watcher::{FileWatcher, RebuildQueue};

/// Runs the development server.
///
/// The initial rebuild must succeed; later rebuilds that fail keep the last
/// good routes and clients.
pub async fn run(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)?;
    config.override_server(host, port);

    let state = Arc::new(AppState::new(Snapshot::empty()));

    let start = Instant::now();
    let outcome = reload(&config, &state)?;
    if !quiet {
        println!(
            "  {} {} {}",
            style("✓").green(),
            style(format!(
                "{} route(s), {} mount(s)",
                outcome.routes, outcome.mounts
            ))
            .dim(),
            style(format!("{}ms", start.elapsed().as_millis())).dim()
        );
    }

    let queue = Arc::new(RebuildQueue::new());
    let rebuild_config = config.clone();
    let rebuild_state = state.clone();
    tokio::spawn(queue.clone().run(move || {
        let start = Instant::now();
        match reload(&rebuild_config, &rebuild_state) {
            Ok(outcome) => {
                tracing::info!(
                    "Rebuilt {} route(s) in {}ms",
                    outcome.routes,
                    start.elapsed().as_millis()
                );
                if !quiet {
                    println!(
                        "  {} {} {}",
                        style("✓").green(),
                        style("rebuilt").dim(),
                        style(format!("{}ms", start.elapsed().as_millis())).dim()
                    );
                }
            }
            Err(e) => {
                tracing::error!("Rebuild failed, keeping previous routes: {}", e);
                if !quiet {
                    eprintln!(
                        "  {} {}",
                        style("✗").red(),
                        style(format!("Rebuild failed: {}", e)).red()
                    );
                }
            }
        }
    }));

    let watcher_queue = queue.clone();
    let excluded: Vec<PathBuf> = vec![config.client_dir()];
    let _watcher = FileWatcher::new(
        &config.server_dir(),
        &excluded,
        config.debounce(),
        move |_paths: Vec<PathBuf>| watcher_queue.request(),
    )?;

    let endpoint = config.server_endpoint();
    let addr = format!("{}:{}", endpoint.host, endpoint.port);
    if !quiet {
        println!(
            "{} {}",
            style("Server:").cyan(),
            style(endpoint.base_url()).green().bold()
        );
        println!(
            "{} {}",
            style("Clients:").cyan(),
            style(config.client_dir().display()).dim()
        );
        println!(
            "{} {}",
            style("Status:").cyan(),
            style("Watching for changes...").dim()
        );
        println!();
    }

    create_server(&addr, state, config.cors_origin().as_deref()).await?;

    Ok(())
}
