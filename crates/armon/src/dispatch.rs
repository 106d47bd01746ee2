// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Dispatch adapter: turns any exported Lua value into a uniform
//! `(method, ctx) -> response` handler.
//!
//! The shape of the export is inspected once, when the store is loaded:
//!
//! ```lua
//! -- Callable: every method goes to the function
//! return function(ctx) return { method = ctx.method } end
//!
//! -- Callable too: a table with a __call metamethod
//! return setmetatable({}, { __call = function(self, ctx) return "hi" end })
//!
//! -- Instance: verbs are looked up on the table and called as obj.get(ctx)
//! return { __is_handler__ = true, get = function(ctx) return "hi" end }
//!
//! -- Constructible: Class:new() runs once, verbs are called as inst:get(ctx)
//! local Counter = {}
//! Counter.__index = Counter
//! function Counter:new() return setmetatable({ n = 0 }, self) end
//! function Counter:post(ctx) self.n = self.n + 1 return { n = self.n } end
//! return { default = Counter }
//! ```

use mlua::{Function, Lua, Table, Value};
use std::path::Path;

use crate::error::{ArmonError, DispatchError, Result};
use crate::request::{HttpMethod, RequestContext};
use crate::response::StoreResponse;

/// Name of the constructor function that marks a table as constructible.
pub const CONSTRUCTOR: &str = "new";

/// The resolved shape of an exported value.
#[derive(Debug, Clone)]
pub enum HandlerShape {
    /// A function; receives every request regardless of method.
    Callable(Function),
    /// A table whose verb functions are called as `obj.verb(ctx)`.
    Instance(Table),
    /// The instance built by a constructible table; verbs are called as
    /// `instance:verb(ctx)`.
    Constructed(Table),
}

/// A uniform handler around one exported value.
#[derive(Debug, Clone)]
pub struct StoreHandler {
    export: String,
    shape: HandlerShape,
}

impl StoreHandler {
    /// Resolves the shape of `value`, constructing an instance if needed.
    ///
    /// Construction runs user code and happens at most once per call, so a
    /// constructed handler keeps its instance for as long as the handler lives.
    pub fn adapt(value: Value, export: &str, path: &Path) -> Result<Self> {
        let shape = match value {
            Value::Function(f) => HandlerShape::Callable(f),
            Value::Table(table) => match table.get::<Value>(CONSTRUCTOR) {
                Ok(Value::Function(new)) => {
                    let instance = new
                        .call::<Value>(table.clone())
                        .map_err(|source| ArmonError::Load {
                            path: path.to_path_buf(),
                            source,
                        })?;
                    match instance {
                        Value::Table(instance) => HandlerShape::Constructed(instance),
                        other => {
                            return Err(ArmonError::InvalidStore {
                                path: path.to_path_buf(),
                                message: format!(
                                    "export '{}': {}() returned {} instead of a table",
                                    export,
                                    CONSTRUCTOR,
                                    other.type_name()
                                ),
                            })
                        }
                    }
                }
                _ => match call_metamethod(&table) {
                    Some(call) => HandlerShape::Callable(call.bind(table).map_err(|source| {
                        ArmonError::Load {
                            path: path.to_path_buf(),
                            source,
                        }
                    })?),
                    None => HandlerShape::Instance(table),
                },
            },
            other => {
                return Err(ArmonError::InvalidStore {
                    path: path.to_path_buf(),
                    message: format!(
                        "export '{}' is a {}, expected a function or a table",
                        export,
                        other.type_name()
                    ),
                })
            }
        };

        Ok(Self {
            export: export.to_string(),
            shape,
        })
    }

    /// The export this handler wraps.
    pub fn export(&self) -> &str {
        &self.export
    }

    /// The resolved shape.
    pub fn shape(&self) -> &HandlerShape {
        &self.shape
    }

    /// Methods this handler can serve.
    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.operation(*m).is_some())
            .collect()
    }

    /// Runs the handler for the request.
    ///
    /// Errors raised by user code come back as [`DispatchError::Handler`]
    /// instead of propagating; the caller picks the HTTP mapping.
    pub fn dispatch(
        &self,
        lua: &Lua,
        ctx: &RequestContext,
    ) -> std::result::Result<StoreResponse, DispatchError> {
        let ctx_table = ctx.to_lua(lua).map_err(|e| DispatchError::handler(&e))?;

        let result = match &self.shape {
            HandlerShape::Callable(f) => f.call::<Value>(ctx_table),
            HandlerShape::Instance(_) | HandlerShape::Constructed(_) => {
                let operation = ctx
                    .http_method()
                    .and_then(|m| self.operation(m))
                    .ok_or_else(|| self.not_allowed(&ctx.method))?;

                match &self.shape {
                    HandlerShape::Constructed(instance) => {
                        operation.call::<Value>((instance.clone(), ctx_table))
                    }
                    _ => operation.call::<Value>(ctx_table),
                }
            }
        };

        result
            .and_then(StoreResponse::from_lua)
            .map_err(|e| DispatchError::handler(&e))
    }

    fn operation(&self, method: HttpMethod) -> Option<Function> {
        match &self.shape {
            HandlerShape::Callable(f) => Some(f.clone()),
            HandlerShape::Instance(table) | HandlerShape::Constructed(table) => {
                match table.get::<Value>(method.operation()) {
                    Ok(Value::Function(f)) => Some(f),
                    _ => None,
                }
            }
        }
    }

    fn not_allowed(&self, method: &str) -> DispatchError {
        DispatchError::MethodNotAllowed {
            method: method.to_string(),
            allowed: self
                .allowed_methods()
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}

/// The `__call` metamethod of a table, if it has one.
fn call_metamethod(table: &Table) -> Option<Function> {
    match table.metatable()?.raw_get::<Value>("__call") {
        Ok(Value::Function(call)) => Some(call),
        _ => None,
    }
}
