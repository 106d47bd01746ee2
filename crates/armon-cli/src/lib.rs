// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Armon CLI library.
//!
//! This crate provides the command-line interface for armon: a development
//! server that routes requests to Lua stores, rebuilds on change, and keeps
//! generated JavaScript clients in sync.
//!
//! # Usage
//!
//! ```bash
//! armon dev        # Serve stores with live rebuilds
//! armon generate   # Write client modules once
//! armon routes     # List discovered routes
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `armon.json` at the project root.

/// CLI commands (dev, generate, routes).
pub mod commands;
/// Project configuration from `armon.json`.
pub mod config;
/// HTTP server and snapshot reloads.
pub mod server;
/// File system watching and rebuild scheduling.
pub mod watcher;
