// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for store discovery, loading, dispatch and client generation.
//!
//! Two families exist:
//!
//! - [`ArmonError`] covers everything that can abort a rebuild or the
//!   generator: a missing server root, a store that normalizes to no
//!   namespace, a store that fails to load, a client file that cannot be
//!   written.
//! - [`DispatchError`] is produced per request by the dispatch adapter and is
//!   never fatal; the transport layer turns it into a response.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rebuilds and client generation.
#[derive(Error, Debug)]
pub enum ArmonError {
    /// No server root was configured at all.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The server root (or another required path) could not be stat'd.
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A discovered store path normalizes to no usable namespace segment.
    #[error("Invalid route {route:?} derived from {}", path.display())]
    InvalidRoute {
        /// The normalized route that was rejected.
        route: String,
        /// The store file it was derived from.
        path: PathBuf,
    },

    /// A store loaded, but its exports have a shape that cannot be served.
    #[error("Invalid store {}: {message}", path.display())]
    InvalidStore {
        /// The store file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The store chunk failed to compile or raised while running.
    #[error("Failed to load store {}: {source}", path.display())]
    Load {
        /// The store file.
        path: PathBuf,
        /// The underlying Lua error.
        source: mlua::Error,
    },

    /// A generated client file could not be written.
    #[error("Could not write client file {}: {source}", path.display())]
    Write {
        /// The destination file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Filesystem I/O error during traversal.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lua runtime error outside of a specific store (state setup, etc).
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),
}

/// Convenience type alias for Results with [`ArmonError`].
pub type Result<T> = std::result::Result<T, ArmonError>;

/// Per-request failure surfaced by the dispatch adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The handler has no operation for the requested method.
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        /// The request method as received.
        method: String,
        /// Operations the handler does expose, upper-cased.
        allowed: Vec<String>,
    },

    /// User handler code raised an error.
    #[error("{message}")]
    Handler {
        /// The rendered error message.
        message: String,
    },
}

impl DispatchError {
    /// Wraps a Lua error raised from user code.
    pub fn handler(err: &mlua::Error) -> Self {
        Self::Handler {
            message: render_lua_error(err),
        }
    }
}

/// Renders a Lua error without the nested callback noise mlua adds.
///
/// Runtime errors raised with `error("...")` inside a callback arrive wrapped
/// in `CallbackError`; the innermost cause is the message the author wrote.
/// Any appended stack traceback is dropped.
pub fn render_lua_error(err: &mlua::Error) -> String {
    match err {
        mlua::Error::CallbackError { cause, .. } => render_lua_error(cause),
        mlua::Error::RuntimeError(message) => strip_traceback(message).to_string(),
        other => other.to_string(),
    }
}

fn strip_traceback(message: &str) -> &str {
    match message.find("\nstack traceback:") {
        Some(end) => &message[..end],
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_runtime_error() {
        let err = mlua::Error::RuntimeError("boom".to_string());
        assert_eq!(render_lua_error(&err), "boom");
    }

    #[test]
    fn test_render_strips_traceback() {
        let err = mlua::Error::RuntimeError(
            "db offline\nstack traceback:\n\t[C]: in function 'error'".to_string(),
        );
        assert_eq!(render_lua_error(&err), "db offline");
    }

    #[test]
    fn test_method_not_allowed_display() {
        let err = DispatchError::MethodNotAllowed {
            method: "PATCH".to_string(),
            allowed: vec!["GET".to_string()],
        };
        assert_eq!(err.to_string(), "Method PATCH not allowed");
    }

    #[test]
    fn test_invalid_route_display() {
        let err = ArmonError::InvalidRoute {
            route: "/".to_string(),
            path: PathBuf::from("server/store.lua"),
        };
        assert!(err.to_string().contains("server/store.lua"));
    }
}
