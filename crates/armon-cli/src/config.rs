// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Armon project configuration.
//!
//! Configuration is loaded from `armon.json` at the project root. Relative
//! `files` paths are resolved against the directory holding the file.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!     "server": { "files": "server", "host": "127.0.0.1", "port": 3000 },
//!     "client": { "files": "client/stores", "port": 5173 },
//!     "watch": { "debounce_ms": 300 }
//! }
//! ```

use armon::Endpoint;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file name.
pub const CONFIG_FILE: &str = "armon.json";

/// Errors loading `armon.json`. All of them abort startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file exists but could not be read.
    #[error("Could not read {}: {source}", path.display())]
    Read {
        /// The config file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid JSON or misses `server`/`client`.
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        /// The config file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A value parsed but cannot be used.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration structure loaded from `armon.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server side: where stores live and where the server listens.
    pub server: SideConfig,
    /// Client side: where generated modules go and where the app is served.
    pub client: SideConfig,
    /// File watching.
    #[serde(default)]
    pub watch: WatchConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One side of the project.
#[derive(Debug, Clone, Deserialize)]
pub struct SideConfig {
    /// Directory, relative to the config file.
    pub files: String,
    /// Host (default: 127.0.0.1).
    #[serde(default)]
    pub host: Option<String>,
    /// Port (default: 3000 for the server, 5173 for the client).
    #[serde(default)]
    pub port: Option<u16>,
    /// Serve over https.
    #[serde(default)]
    pub secure: Option<bool>,
}

/// File watching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds (default: 300).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;
/// Default client port.
pub const DEFAULT_CLIENT_PORT: u16 = 5173;

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SideConfig {
    fn endpoint(&self, default_port: u16) -> Endpoint {
        Endpoint {
            host: self.host.clone().unwrap_or_else(default_host),
            port: self.port.unwrap_or(default_port),
            secure: self.secure.unwrap_or(false),
        }
    }
}

impl Config {
    /// Loads configuration from the given file.
    ///
    /// # Errors
    ///
    /// Unlike most tools, a missing file is an error: without it there is no
    /// server root to watch.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::parse(&content, base_dir).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses configuration text; relative paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Config =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from(CONFIG_FILE),
                source,
            })?;
        config.base_dir = base_dir.into();

        if config.server.files.trim().is_empty() {
            return Err(ConfigError::Invalid("server.files must not be empty".to_string()));
        }
        if config.client.files.trim().is_empty() {
            return Err(ConfigError::Invalid("client.files must not be empty".to_string()));
        }

        Ok(config)
    }

    /// The server root stores are discovered under.
    pub fn server_dir(&self) -> PathBuf {
        self.base_dir.join(&self.server.files)
    }

    /// The directory generated client modules are written to.
    pub fn client_dir(&self) -> PathBuf {
        self.base_dir.join(&self.client.files)
    }

    /// Where the server listens and where generated clients send requests.
    pub fn server_endpoint(&self) -> Endpoint {
        self.server.endpoint(DEFAULT_SERVER_PORT)
    }

    /// Where the client application is served from.
    pub fn client_endpoint(&self) -> Endpoint {
        self.client.endpoint(DEFAULT_CLIENT_PORT)
    }

    /// The client origin to allow cross-origin requests from, if it differs
    /// from the server's own origin.
    pub fn cors_origin(&self) -> Option<String> {
        let client = self.client_endpoint();
        if client == self.server_endpoint() {
            None
        } else {
            Some(client.base_url())
        }
    }

    /// Debounce window for the file watcher.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch.debounce_ms)
    }

    /// Overrides the server host and/or port.
    pub fn override_server(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = Some(host);
        }
        if let Some(port) = port {
            self.server.port = Some(port);
        }
    }
}
