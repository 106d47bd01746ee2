// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Transport-agnostic request context handed to store handlers.

use mlua::{Lua, Result as LuaResult, Table, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::convert::json_to_lua;

/// HTTP methods a store can implement.
///
/// Each maps to a same-named lower-case operation on a handler object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET` → `get`
    Get,
    /// `POST` → `post`
    Post,
    /// `PUT` → `put`
    Put,
    /// `DELETE` → `delete`
    Delete,
    /// `PATCH` → `patch`
    Patch,
    /// `HEAD` → `head`
    Head,
    /// `OPTIONS` → `options`
    Options,
    /// `TRACE` → `trace`
    Trace,
    /// `CONNECT` → `connect`
    Connect,
}

impl HttpMethod {
    /// All methods, in the order used for `Allow` headers.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
        HttpMethod::Connect,
    ];

    /// The wire name (`GET`, `POST`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }

    /// The handler operation name (`get`, `post`, ...).
    pub fn operation(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
            HttpMethod::Connect => "connect",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    /// Case-sensitive: only the upper-case wire names parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as seen by a store handler.
///
/// # Example
///
/// ```rust
/// use armon::RequestContext;
///
/// let ctx = RequestContext::new("POST", "/Users")
///     .with_header("content-type", "application/json")
///     .with_body(br#"{"name":"a"}"#.to_vec());
/// assert_eq!(ctx.body_json().unwrap()["name"], "a");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request method as received (e.g. "GET").
    pub method: String,
    /// Request path (e.g. "/Users").
    pub path: String,
    /// Query parameters.
    pub query: HashMap<String, String>,
    /// Request headers, names lower-cased.
    pub headers: HashMap<String, String>,
    /// Raw request body, if any.
    pub body: Option<Vec<u8>>,
}

impl RequestContext {
    /// Creates a context with the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the query parameters.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Sets all headers. Names are lower-cased.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        self
    }

    /// Adds a single header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// The parsed method, or `None` for a method no store can implement.
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.method.parse().ok()
    }

    /// Returns the Content-Type header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Returns the body as a string, if present and valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the body parsed as JSON, if present and valid.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body_str().and_then(|s| serde_json::from_str(s).ok())
    }

    /// Builds the `ctx` table passed to Lua handlers.
    ///
    /// `body` holds decoded JSON for JSON requests, a table for url-encoded
    /// forms, the raw string otherwise. `json` and `form` alias `body`.
    pub fn to_lua(&self, lua: &Lua) -> LuaResult<Table> {
        let ctx = lua.create_table()?;
        ctx.set("method", self.method.as_str())?;
        ctx.set("path", self.path.as_str())?;
        ctx.set("url", self.path.as_str())?;

        let query = lua.create_table()?;
        for (k, v) in &self.query {
            query.set(k.as_str(), v.as_str())?;
        }
        ctx.set("query", query)?;

        let headers = lua.create_table()?;
        for (k, v) in &self.headers {
            headers.set(k.as_str(), v.as_str())?;
        }
        ctx.set("headers", headers)?;

        let body = self.body_to_lua(lua)?;
        ctx.set("body", body.clone())?;
        ctx.set("json", body.clone())?;
        ctx.set("form", body)?;

        Ok(ctx)
    }

    fn body_to_lua(&self, lua: &Lua) -> LuaResult<Value> {
        let Some(bytes) = self.body.as_deref().filter(|b| !b.is_empty()) else {
            return Ok(Value::Nil);
        };

        let content_type = self.content_type().unwrap_or_default();
        if content_type.starts_with("application/x-www-form-urlencoded") {
            let form = lua.create_table()?;
            for (k, v) in form_urlencoded::parse(bytes) {
                form.set(k.as_ref(), v.as_ref())?;
            }
            return Ok(Value::Table(form));
        }

        if let Some(json) = self.body_json() {
            if content_type.is_empty() || content_type.contains("json") {
                return json_to_lua(lua, &json);
            }
        }

        match self.body_str() {
            Some(text) => Ok(Value::String(lua.create_string(text)?)),
            None => Ok(Value::String(lua.create_string(bytes)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_sensitive() {
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("patch".parse::<HttpMethod>().is_err());
        assert!("BREW".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Options.operation(), "options");
    }

    #[test]
    fn test_json_body_in_lua() {
        let lua = Lua::new();
        let ctx = RequestContext::new("POST", "/Users")
            .with_header("Content-Type", "application/json")
            .with_body(br#"{"name":"a"}"#.to_vec());

        let table = ctx.to_lua(&lua).unwrap();
        let name: String = lua
            .load("local ctx = ... return ctx.body.name .. ctx.json.name")
            .call(table)
            .unwrap();
        assert_eq!(name, "aa");
    }

    #[test]
    fn test_form_body_in_lua() {
        let lua = Lua::new();
        let ctx = RequestContext::new("POST", "/Users")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(b"name=a+b&age=3".to_vec());

        let table = ctx.to_lua(&lua).unwrap();
        let body: Table = table.get("form").unwrap();
        assert_eq!(body.get::<String>("name").unwrap(), "a b");
        assert_eq!(body.get::<String>("age").unwrap(), "3");
    }

    #[test]
    fn test_text_body_and_empty_body() {
        let lua = Lua::new();
        let ctx = RequestContext::new("POST", "/Notes")
            .with_header("content-type", "text/plain")
            .with_body(b"hello".to_vec());
        let table = ctx.to_lua(&lua).unwrap();
        assert_eq!(table.get::<String>("body").unwrap(), "hello");

        let empty = RequestContext::new("GET", "/Notes").to_lua(&lua).unwrap();
        assert!(matches!(empty.get::<Value>("body").unwrap(), Value::Nil));
    }
}
