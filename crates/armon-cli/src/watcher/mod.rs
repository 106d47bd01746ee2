// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for live rebuilds.
//!
//! Two pieces work together:
//!
//! - [`FileWatcher`] turns debounced filesystem events under the server root
//!   into rebuild requests, ignoring dependency caches, build output and the
//!   generated client directory.
//! - [`RebuildQueue`] runs those requests one at a time. While a rebuild is
//!   running, any number of further requests collapse into exactly one
//!   follow-up rebuild.

use armon::locator::IGNORED_DIRS;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Watcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    /// Waiting for a change.
    Idle,
    /// Running a rebuild.
    Rebuilding,
}

/// Single-flight, latest-wins rebuild scheduling.
#[derive(Debug)]
pub struct RebuildQueue {
    trigger: Notify,
    state: AtomicU8,
}

const IDLE: u8 = 0;
const REBUILDING: u8 = 1;

impl Default for RebuildQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RebuildQueue {
    /// Creates an idle queue with nothing pending.
    pub fn new() -> Self {
        Self {
            trigger: Notify::new(),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Requests a rebuild. Safe to call from any thread.
    ///
    /// At most one request is kept pending; repeated calls before the next
    /// rebuild starts are merged.
    pub fn request(&self) {
        self.trigger.notify_one();
    }

    /// The current state.
    pub fn state(&self) -> RebuildState {
        match self.state.load(Ordering::Acquire) {
            REBUILDING => RebuildState::Rebuilding,
            _ => RebuildState::Idle,
        }
    }

    /// Runs `rebuild` once per (merged) request, forever.
    ///
    /// The state returns to `Idle` after every run, whether it succeeded or
    /// not; `rebuild` is responsible for logging its own failures.
    pub async fn run<F>(self: Arc<Self>, mut rebuild: F)
    where
        F: FnMut() + Send + 'static,
    {
        loop {
            self.trigger.notified().await;
            self.state.store(REBUILDING, Ordering::Release);
            rebuild();
            self.state.store(IDLE, Ordering::Release);
        }
    }
}

/// Watches the server root and reports relevant changes.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Starts watching `root` recursively.
    ///
    /// # Arguments
    ///
    /// * `root` - Server root to watch
    /// * `excluded` - Directories whose events are ignored (generated output)
    /// * `debounce` - Debounce window
    /// * `on_change` - Called with the changed paths after each debounced burst
    pub fn new<F>(
        root: &Path,
        excluded: &[PathBuf],
        debounce: Duration,
        on_change: F,
    ) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let root = fs::canonicalize(root)?;
        let excluded: Vec<PathBuf> = excluded
            .iter()
            .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
            .collect();
        let filter_root = root.clone();

        let mut debouncer = new_debouncer(
            debounce,
            None,
            move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
                Ok(events) => {
                    let mut changed: Vec<PathBuf> = events
                        .iter()
                        .flat_map(|e| e.paths.iter())
                        .filter(|p| is_relevant(p, &filter_root, &excluded))
                        .cloned()
                        .collect();
                    changed.sort();
                    changed.dedup();

                    if !changed.is_empty() {
                        tracing::debug!("Changed: {:?}", changed);
                        on_change(changed);
                    }
                }
                Err(errors) => {
                    for e in errors {
                        tracing::warn!("Watch error: {}", e);
                    }
                }
            },
        )?;

        debouncer.watch(&root, RecursiveMode::Recursive)?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Returns true if a change at `path` should trigger a rebuild.
pub fn is_relevant(path: &Path, root: &Path, excluded: &[PathBuf]) -> bool {
    if excluded.iter().any(|dir| path.starts_with(dir)) {
        return false;
    }

    let relative = path.strip_prefix(root).unwrap_or(path);
    !relative.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relevant() {
        let root = Path::new("/srv/server");
        let excluded = vec![PathBuf::from("/srv/server/Client")];

        assert!(is_relevant(Path::new("/srv/server/Users/store.lua"), root, &excluded));
        assert!(is_relevant(Path::new("/srv/server/shared.lua"), root, &excluded));
        assert!(!is_relevant(
            Path::new("/srv/server/node_modules/x/index.js"),
            root,
            &excluded
        ));
        assert!(!is_relevant(Path::new("/srv/server/Users/.git/HEAD"), root, &excluded));
        assert!(!is_relevant(Path::new("/srv/server/Client/Users.js"), root, &excluded));
    }

    #[test]
    fn test_queue_starts_idle() {
        let queue = RebuildQueue::new();
        assert_eq!(queue.state(), RebuildState::Idle);
    }
}
