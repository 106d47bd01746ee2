// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route table listing.

use console::style;
use serde::Serialize;
use std::path::Path;

use armon::{rebuild, RouteStyle, RouteTable};

use crate::config::Config;

#[derive(Debug, Serialize)]
struct RouteRow<'a> {
    route: &'a str,
    style: RouteStyle,
    members: &'a [String],
}

/// Prints the discovered routes, as a table or as JSON.
pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let snapshot = rebuild(&config.server_dir())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows(snapshot.table()))?);
        return Ok(());
    }

    if snapshot.table().is_empty() {
        println!("No stores found in {}", config.server_dir().display());
        return Ok(());
    }

    for row in rows(snapshot.table()) {
        let style_label = match row.style {
            RouteStyle::Verb => "verb",
            RouteStyle::Member => "member",
        };
        println!(
            "  {} {} {}",
            style(row.route).green(),
            style(format!("[{}]", style_label)).cyan(),
            style(row.members.join(", ")).dim()
        );
    }

    Ok(())
}

fn rows(table: &RouteTable) -> Vec<RouteRow<'_>> {
    table
        .iter()
        .map(|entry| RouteRow {
            route: &entry.route,
            style: entry.style(),
            members: &entry.member_names,
        })
        .collect()
}
