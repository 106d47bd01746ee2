// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `dev`: Serve stores with live rebuilds and client regeneration
//! - `generate`: Generate client modules once
//! - `routes`: Print the discovered route table

/// Development server command.
pub mod dev;
/// One-shot client generation command.
pub mod generate;
/// Route listing command.
pub mod routes;
