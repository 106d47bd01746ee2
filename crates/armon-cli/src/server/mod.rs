// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development server components.
//!
//! # Components
//!
//! - `http`: HTTP server using Axum, dispatching to the published snapshot
//! - `reload`: rebuilds the snapshot and regenerates clients

/// HTTP server implementation using Axum.
pub mod http;
/// Snapshot rebuilds and client regeneration.
pub mod reload;

pub use http::{create_router, create_server, AppState};
pub use reload::{reload, ReloadOutcome};
