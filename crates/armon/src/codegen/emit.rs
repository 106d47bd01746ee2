// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! JavaScript emission for [`ClientModule`]s.
//!
//! A generated module looks like this:
//!
//! ```js
//! import { request } from './utils.js'
//!
//! const BASE_URL = 'http://127.0.0.1:3000'
//!
//! export class TodosStore {
//!     static async create({ data, options = {} } = {}) {
//!         const method = options.method || (data === undefined ? 'GET' : 'POST')
//!         ...
//!         return request(BASE_URL + '/Todos/create', withPayload({ ...options, method }, data))
//!     }
//! }
//!
//! export default TodosStore
//! ```

use super::{ClientModule, Endpoint, MethodPolicy, Operation, Payload, HELPER_FILE};

/// Renders a client module to JavaScript source.
pub fn emit_module(module: &ClientModule, endpoint: &Endpoint) -> String {
    let mut generator = JsCodeGenerator::new();
    generator.generate(module, endpoint);
    generator.output
}

struct JsCodeGenerator {
    output: String,
    indent_level: usize,
}

impl JsCodeGenerator {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    fn generate(&mut self, module: &ClientModule, endpoint: &Endpoint) {
        self.write_line(&format!(
            "// Generated by armon for the {} namespace. Changes are overwritten on rebuild.",
            module.namespace
        ));
        self.write_line(&format!("import {{ request }} from './{}'", HELPER_FILE));
        self.write_line("");
        self.write_line(&format!("const BASE_URL = {}", js_string(&endpoint.base_url())));
        self.write_line("");
        self.generate_helpers();

        self.write_line(&format!("export class {} {{", module.class_name));
        self.indent();
        for (i, operation) in module.operations.iter().enumerate() {
            if i > 0 {
                self.write_line("");
            }
            self.generate_operation(&module.class_name, operation);
        }
        self.dedent();
        self.write_line("}");
        self.write_line("");
        self.write_line(&format!("export default {}", module.class_name));
    }

    fn generate_helpers(&mut self) {
        self.write_line("function withPayload(options, data) {");
        self.indent();
        self.write_line("if (data === undefined) {");
        self.indent();
        self.write_line("return options");
        self.dedent();
        self.write_line("}");
        self.write_line("return {");
        self.indent();
        self.write_line("...options,");
        self.write_line("headers: { 'Content-Type': 'application/json', ...(options.headers || {}) },");
        self.write_line("body: JSON.stringify(data),");
        self.dedent();
        self.write_line("}");
        self.dedent();
        self.write_line("}");
        self.write_line("");
    }

    fn generate_operation(&mut self, class_name: &str, operation: &Operation) {
        let label = format!("{}.{}", class_name, operation.name);
        let url = format!("BASE_URL + {}", js_string(&operation.call.path));

        self.write_line(&format!(
            "static async {}({{ data, options = {{}} }} = {{}}) {{",
            method_name(&operation.name)
        ));
        self.indent();

        match operation.call.method {
            MethodPolicy::Inferred => {
                self.write_line(
                    "const method = options.method || (data === undefined ? 'GET' : 'POST')",
                );
                self.write_line("if (method === 'GET' && data !== undefined) {");
                self.indent();
                self.throw(&format!("{}: GET requests cannot carry data", label));
                self.dedent();
                self.write_line("}");
                self.write_line(&format!(
                    "return request({}, withPayload({{ ...options, method }}, data))",
                    url
                ));
            }
            MethodPolicy::Fixed { verb, payload } => {
                let method = js_string(verb.as_str());
                match payload {
                    Payload::Required => {
                        self.write_line("if (data === undefined) {");
                        self.indent();
                        self.throw(&format!("{} requires data", label));
                        self.dedent();
                        self.write_line("}");
                        self.write_line(&format!(
                            "return request({}, withPayload({{ ...options, method: {} }}, data))",
                            url, method
                        ));
                    }
                    Payload::Forbidden => {
                        self.write_line("if (data !== undefined) {");
                        self.indent();
                        self.throw(&format!("{} does not accept data", label));
                        self.dedent();
                        self.write_line("}");
                        self.write_line(&format!(
                            "return request({}, {{ ...options, method: {} }})",
                            url, method
                        ));
                    }
                }
            }
        }

        self.dedent();
        self.write_line("}");
    }

    fn throw(&mut self, message: &str) {
        self.write_line(&format!("throw new Error({})", js_string(message)));
    }

    fn write_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent_level {
                self.output.push_str("    ");
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

/// A class method name: bare when it is a valid identifier, quoted otherwise.
fn method_name(name: &str) -> String {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };

    if valid {
        name.to_string()
    } else {
        js_string(name)
    }
}

/// A single-quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::plan;
    use crate::route::{RouteEntry, RouteTable};

    fn emit(route: &str, members: &[&str]) -> String {
        let mut table = RouteTable::new();
        table.insert(RouteEntry::new(
            route,
            members.iter().map(|m| m.to_string()).collect(),
        ));
        let modules = plan(&table);
        emit_module(&modules[0], &Endpoint::new("127.0.0.1", 3000))
    }

    #[test]
    fn test_verb_style_output() {
        let js = emit("/Users", &["default"]);

        assert!(js.contains("import { request } from './utils.js'"));
        assert!(js.contains("const BASE_URL = 'http://127.0.0.1:3000'"));
        assert!(js.contains("export class UsersStore {"));
        for op in ["get", "post", "put", "delete"] {
            assert!(js.contains(&format!("    static async {}({{ data, options = {{}} }} = {{}}) {{", op)));
        }
        assert!(js.contains("throw new Error('UsersStore.get does not accept data')"));
        assert!(js.contains("throw new Error('UsersStore.post requires data')"));
        assert!(js.contains(
            "return request(BASE_URL + '/Users', withPayload({ ...options, method: 'POST' }, data))"
        ));
        assert!(js.contains("return request(BASE_URL + '/Users', { ...options, method: 'GET' })"));
        assert!(js.ends_with("export default UsersStore\n"));
    }

    #[test]
    fn test_member_style_output() {
        let js = emit("/Todos", &["create", "remove"]);

        assert!(js.contains("static async create("));
        assert!(js.contains("static async remove("));
        assert!(!js.contains("static async get("));
        assert!(js.contains("const method = options.method || (data === undefined ? 'GET' : 'POST')"));
        assert!(js.contains("throw new Error('TodosStore.create: GET requests cannot carry data')"));
        assert!(js.contains(
            "return request(BASE_URL + '/Todos/create', withPayload({ ...options, method }, data))"
        ));
    }

    #[test]
    fn test_odd_member_names_are_quoted() {
        let js = emit("/Todos", &["mark-done"]);
        assert!(js.contains("static async 'mark-done'("));
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("it's"), r"'it\'s'");
        assert_eq!(js_string("a\\b\n"), r"'a\\b\n'");
    }
}
