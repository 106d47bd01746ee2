// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Client generation.
//!
//! Generation runs in three stages:
//!
//! 1. [`plan`] groups the route table by namespace into [`ClientModule`]s,
//!    one per `<Namespace>.js` file, each holding the operations and the HTTP
//!    call each operation performs.
//! 2. [`emit`] renders a module to JavaScript.
//! 3. [`writer`] puts the modules and the shared `utils.js` helper on disk.

pub mod emit;
pub mod writer;

use std::fmt;

use crate::request::HttpMethod;
use crate::route::{RouteEntry, RouteStyle, RouteTable};

pub use emit::emit_module;
pub use writer::{generate, GenerateReport, HELPER_FILE, UTILS_TEMPLATE};

/// Where generated clients send their requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Use https instead of http.
    pub secure: bool,
}

impl Endpoint {
    /// Creates a plain-http endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            secure: false,
        }
    }

    /// `http(s)://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Whether a fixed-verb operation takes a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Calling without `data` is an error.
    Required,
    /// Calling with `data` is an error.
    Forbidden,
}

/// How an operation picks its HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPolicy {
    /// `options.method` if given, else GET without data and POST with data.
    /// GET with data is an error.
    Inferred,
    /// Always the given verb.
    Fixed {
        /// The verb.
        verb: HttpMethod,
        /// Payload rule for the verb.
        payload: Payload,
    },
}

/// The request an operation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCall {
    /// Server path, relative to the endpoint.
    pub path: String,
    /// Method selection.
    pub method: MethodPolicy,
}

/// One static method on a generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Method name.
    pub name: String,
    /// The request it performs.
    pub call: HttpCall,
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientModule {
    /// The top-level namespace folder.
    pub namespace: String,
    /// Exported class name, `<Namespace>Store`.
    pub class_name: String,
    /// File name, `<Namespace>.js`.
    pub file_name: String,
    /// Operations in emission order.
    pub operations: Vec<Operation>,
}

/// The verbs a verb-style client exposes, with their payload rules.
pub const VERB_OPERATIONS: [(HttpMethod, Payload); 4] = [
    (HttpMethod::Get, Payload::Forbidden),
    (HttpMethod::Post, Payload::Required),
    (HttpMethod::Put, Payload::Required),
    (HttpMethod::Delete, Payload::Required),
];

/// Groups the route table into client modules, in first-seen namespace order.
pub fn plan(table: &RouteTable) -> Vec<ClientModule> {
    let mut modules: Vec<ClientModule> = Vec::new();

    for entry in table.iter() {
        let namespace = entry.namespace();
        if namespace.is_empty() {
            continue;
        }

        let index = match modules.iter().position(|m| m.namespace == namespace) {
            Some(index) => index,
            None => {
                modules.push(ClientModule {
                    namespace: namespace.to_string(),
                    class_name: format!("{}Store", identifier(namespace)),
                    file_name: format!("{}.js", namespace),
                    operations: Vec::new(),
                });
                modules.len() - 1
            }
        };

        let module = &mut modules[index];
        for operation in operations_for(entry) {
            match module.operations.iter_mut().find(|o| o.name == operation.name) {
                Some(existing) => {
                    tracing::warn!(
                        "Operation {}.{} generated twice, using {}",
                        module.class_name,
                        operation.name,
                        operation.call.path
                    );
                    *existing = operation;
                }
                None => module.operations.push(operation),
            }
        }
    }

    modules
}

fn operations_for(entry: &RouteEntry) -> Vec<Operation> {
    let prefix = operation_prefix(&entry.route);

    match entry.style() {
        RouteStyle::Verb => VERB_OPERATIONS
            .iter()
            .map(|(verb, payload)| Operation {
                name: prefixed(&prefix, verb.operation()),
                call: HttpCall {
                    path: entry.route.clone(),
                    method: MethodPolicy::Fixed {
                        verb: *verb,
                        payload: *payload,
                    },
                },
            })
            .collect(),
        RouteStyle::Member => entry
            .named_members()
            .map(|member| Operation {
                name: prefixed(&prefix, member),
                call: HttpCall {
                    path: format!("{}/{}", entry.route, member),
                    method: MethodPolicy::Inferred,
                },
            })
            .collect(),
    }
}

/// Lower-camel-cased route segments below the namespace.
///
/// `/Users` yields `""`, `/Users/Admin/Reports` yields `adminReports`.
fn operation_prefix(route: &str) -> String {
    let mut prefix = String::new();
    for segment in route.split('/').filter(|s| !s.is_empty()).skip(1) {
        let segment = identifier(segment);
        if prefix.is_empty() {
            prefix.push_str(&lower_first(&segment));
        } else {
            prefix.push_str(&upper_first(&segment));
        }
    }
    prefix
}

fn prefixed(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}", prefix, upper_first(name))
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces characters that cannot appear in a JavaScript identifier.
pub(crate) fn identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
