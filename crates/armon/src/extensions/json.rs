// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! JSON module registration for Lua.
//!
//! Provides `json.encode`, `json.decode`, `json.encode_pretty`, and `json.null`
//! to store code, both as a global and through `require("json")`.

use mlua::{Lua, Result as LuaResult, Table, Value};

use crate::convert::{json_to_lua, lua_to_json, null};

/// Register the json module as a global on the given Lua instance.
///
/// # Example
///
/// ```rust,ignore
/// use mlua::Lua;
/// use armon::extensions::register_json_module;
///
/// let lua = Lua::new();
/// register_json_module(&lua)?;
/// ```
pub fn register_json_module(lua: &Lua) -> LuaResult<()> {
    let globals = lua.globals();
    globals.set("json", create_json_module(lua)?)?;

    let package: Table = globals.get("package")?;
    let preload: Table = package.get("preload")?;
    let loader = lua.create_function(|lua, _: ()| create_json_module(lua))?;
    preload.set("json", loader)?;

    Ok(())
}

fn create_json_module(lua: &Lua) -> LuaResult<Table> {
    let module = lua.create_table()?;

    let encode = lua.create_function(|_, value: Value| {
        serde_json::to_string(&lua_to_json(&value)?)
            .map_err(|err| mlua::Error::external(format!("JSON encode error: {}", err)))
    })?;
    module.set("encode", encode)?;

    let encode_pretty = lua.create_function(|_, value: Value| {
        serde_json::to_string_pretty(&lua_to_json(&value)?)
            .map_err(|err| mlua::Error::external(format!("JSON encode error: {}", err)))
    })?;
    module.set("encode_pretty", encode_pretty)?;

    let decode = lua.create_function(|lua, source: String| {
        let value = serde_json::from_str::<serde_json::Value>(&source)
            .map_err(|err| mlua::Error::external(format!("JSON decode error: {}", err)))?;
        json_to_lua(lua, &value)
    })?;
    module.set("decode", decode)?;

    // Lua has no null; a null light userdata encodes as JSON null.
    module.set("null", null())?;

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let lua = Lua::new();
        register_json_module(&lua).unwrap();

        let encoded: String = lua
            .load(r#"return json.encode({ items = { 1, 2, 3 } })"#)
            .eval()
            .unwrap();
        assert_eq!(encoded, r#"{"items":[1,2,3]}"#);

        let name: String = lua
            .load(r#"return json.decode('{"name":"a"}').name"#)
            .eval()
            .unwrap();
        assert_eq!(name, "a");
    }

    #[test]
    fn test_decoded_array_keeps_nulls() {
        let lua = Lua::new();
        register_json_module(&lua).unwrap();

        let (len, is_null, encoded): (i64, bool, String) = lua
            .load(
                r#"
                local t = json.decode('[1,null,3]')
                return #t, t[2] == json.null, json.encode(t)
                "#,
            )
            .eval()
            .unwrap();
        assert_eq!(len, 3);
        assert!(is_null);
        assert_eq!(encoded, "[1,null,3]");
    }

    #[test]
    fn test_require_json() {
        let lua = Lua::new();
        register_json_module(&lua).unwrap();

        let encoded: String = lua
            .load(r#"local j = require("json") return j.encode({ v = j.null })"#)
            .eval()
            .unwrap();
        assert_eq!(encoded, r#"{"v":null}"#);
    }

    #[test]
    fn test_decode_error() {
        let lua = Lua::new();
        register_json_module(&lua).unwrap();

        let result = lua.load(r#"return json.decode("{nope")"#).exec();
        assert!(result.is_err());
    }
}
