// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]
#![allow(clippy::result_large_err)]

//! # Armon
//!
//! Folder-convention HTTP routing for Lua stores, with generated JavaScript
//! clients.
//!
//! Every capitalized folder under the server root is a namespace. A
//! `store.lua` inside it is loaded, its exports become HTTP endpoints
//! dispatched by method, and a `<Namespace>.js` client module is generated
//! whose static methods call those endpoints.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armon::{generate, rebuild, Endpoint, RequestContext};
//!
//! let snapshot = rebuild(Path::new("./server"))?;
//! generate(snapshot.table(), Path::new("./client"), &Endpoint::new("127.0.0.1", 3000))?;
//!
//! let response = snapshot.dispatch(&RequestContext::new("GET", "/Users"));
//! ```

/// Error types.
pub mod error;
/// Store discovery.
pub mod locator;
/// Route normalization and the route table.
pub mod route;
/// Store loading and export extraction.
pub mod store;
/// Handler shapes and per-method dispatch.
pub mod dispatch;
/// Path matching over adapted handlers.
pub mod mount;
/// Full rebuilds and immutable snapshots.
pub mod pipeline;
/// Client module generation.
pub mod codegen;
/// Request context handed to stores.
pub mod request;
/// Responses produced by stores.
pub mod response;
/// Lua runtime extensions.
pub mod extensions;
mod convert;

pub use codegen::{generate, ClientModule, Endpoint, GenerateReport};
pub use dispatch::{HandlerShape, StoreHandler};
pub use error::{ArmonError, DispatchError, Result};
pub use locator::locate;
pub use mount::{Mount, MountTable};
pub use pipeline::{rebuild, Snapshot};
pub use request::{HttpMethod, RequestContext};
pub use response::{ResponseBody, StoreResponse};
pub use route::{RouteEntry, RouteStyle, RouteTable};
pub use extensions::register_json_module;
