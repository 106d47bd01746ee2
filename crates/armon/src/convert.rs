// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Conversions between JSON values and Lua values.

use mlua::{LightUserData, Lua, Result as LuaResult, Table, Value};
use serde_json::Value as JsonValue;
use std::ptr;

/// Tables nested deeper than this are rejected (guards against cycles).
const MAX_DEPTH: usize = 64;

/// The `json.null` sentinel: a null light userdata, encoded back as `null`.
pub(crate) fn null() -> Value {
    Value::LightUserData(LightUserData(ptr::null_mut()))
}

/// Converts a JSON value into a Lua value.
///
/// `null` becomes `nil`, except inside arrays where it becomes [`null()`] so
/// the array keeps its length and converts back without holes.
pub(crate) fn json_to_lua(lua: &Lua, json: &JsonValue) -> LuaResult<Value> {
    Ok(match json {
        JsonValue::Null => Value::Nil,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Number).unwrap_or(Value::Nil),
        },
        JsonValue::String(s) => Value::String(lua.create_string(s)?),
        JsonValue::Array(items) => {
            let table = lua.create_table_with_capacity(items.len(), 0)?;
            for (i, item) in items.iter().enumerate() {
                let item = match item {
                    JsonValue::Null => null(),
                    other => json_to_lua(lua, other)?,
                };
                table.raw_set(i + 1, item)?;
            }
            Value::Table(table)
        }
        JsonValue::Object(map) => {
            let table = lua.create_table_with_capacity(0, map.len())?;
            for (key, item) in map {
                table.raw_set(key.as_str(), json_to_lua(lua, item)?)?;
            }
            Value::Table(table)
        }
    })
}

/// Converts a Lua value into JSON.
///
/// Tables with keys `1..n` and nothing else become arrays, other tables become
/// objects. Functions, threads and userdata become `null`.
pub(crate) fn lua_to_json(value: &Value) -> LuaResult<JsonValue> {
    to_json(value, 0)
}

fn to_json(value: &Value, depth: usize) -> LuaResult<JsonValue> {
    if depth > MAX_DEPTH {
        return Err(mlua::Error::runtime(
            "value nested too deeply to convert to JSON (cyclic table?)",
        ));
    }

    Ok(match value {
        Value::Nil => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.to_str()?.to_string()),
        Value::Table(t) => table_to_json(t, depth)?,
        _ => JsonValue::Null,
    })
}

fn table_to_json(table: &Table, depth: usize) -> LuaResult<JsonValue> {
    let mut max_index = 0i64;
    let mut count = 0i64;
    let mut is_array = true;

    for pair in table.clone().pairs::<Value, Value>() {
        let (key, _) = pair?;
        count += 1;
        match key {
            Value::Integer(i) if i > 0 => max_index = max_index.max(i),
            _ => is_array = false,
        }
    }

    if is_array && max_index > 0 && max_index == count {
        let mut items = Vec::with_capacity(max_index as usize);
        for i in 1..=max_index {
            let item: Value = table.raw_get(i)?;
            items.push(to_json(&item, depth + 1)?);
        }
        return Ok(JsonValue::Array(items));
    }

    let mut map = serde_json::Map::new();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, item) = pair?;
        let key = match key {
            Value::String(s) => s.to_str()?.to_string(),
            Value::Integer(i) => i.to_string(),
            _ => continue,
        };
        map.insert(key, to_json(&item, depth + 1)?);
    }
    Ok(JsonValue::Object(map))
}
