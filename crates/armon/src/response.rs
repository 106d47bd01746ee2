// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Responses produced by store handlers.

use mlua::{Result as LuaResult, Table, Value};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::convert::lua_to_json;

/// Body of a [`StoreResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body.
    Empty,
    /// Plain text (handler returned a string).
    Text(String),
    /// JSON (handler returned a table or scalar).
    Json(JsonValue),
}

/// A platform-agnostic response from a store handler.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: ResponseBody,
}

impl StoreResponse {
    /// A 200 JSON response.
    pub fn json(body: JsonValue) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: ResponseBody::Json(body),
        }
    }

    /// A 200 text response.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: ResponseBody::Text(body.into()),
        }
    }

    /// A 204 response.
    pub fn no_content() -> Self {
        Self {
            status: 204,
            headers: HashMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Converts a handler's return value.
    ///
    /// - `nil` → 204
    /// - string → 200 text
    /// - table with a numeric `status` → envelope with `status`, `headers`, `body`
    /// - anything else → 200 JSON
    pub fn from_lua(value: Value) -> LuaResult<Self> {
        match value {
            Value::Nil => Ok(Self::no_content()),
            Value::String(s) => Ok(Self::text(s.to_str()?.to_string())),
            Value::Table(table) => match table.get::<Option<u16>>("status") {
                Ok(Some(status)) => Self::from_envelope(status, &table),
                _ => Ok(Self::json(lua_to_json(&Value::Table(table))?)),
            },
            other => Ok(Self::json(lua_to_json(&other)?)),
        }
    }

    fn from_envelope(status: u16, table: &Table) -> LuaResult<Self> {
        let mut headers = HashMap::new();
        if let Ok(Some(header_table)) = table.get::<Option<Table>>("headers") {
            for (k, v) in header_table.pairs::<String, String>().flatten() {
                headers.insert(k, v);
            }
        }

        let body = match table.get::<Value>("body")? {
            Value::Nil => ResponseBody::Empty,
            Value::String(s) => ResponseBody::Text(s.to_str()?.to_string()),
            other => ResponseBody::Json(lua_to_json(&other)?),
        };

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
