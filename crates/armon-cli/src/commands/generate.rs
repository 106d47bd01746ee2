// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! One-shot client generation.

use console::style;
use std::path::Path;

use armon::{generate, rebuild};

use crate::config::Config;

/// Rebuilds once and writes the client modules.
pub fn run(config_path: &Path, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;

    let snapshot = rebuild(&config.server_dir())?;
    let report = generate(
        snapshot.table(),
        &config.client_dir(),
        &config.server_endpoint(),
    )?;

    if !quiet {
        if report.helper_created {
            println!(
                "  {} {}",
                style("+").green(),
                style(config.client_dir().join(armon::codegen::HELPER_FILE).display()).dim()
            );
        }
        for file in &report.files {
            println!("  {} {}", style("✓").green(), style(file.display()).dim());
        }
        println!(
            "{} {} file(s) from {} route(s)",
            style("Generated").cyan(),
            report.files.len(),
            snapshot.table().len()
        );
    }

    Ok(())
}
