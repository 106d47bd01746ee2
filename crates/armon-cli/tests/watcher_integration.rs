// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Integration tests for live rebuilds.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use armon::{RequestContext, ResponseBody, Snapshot};
use armon_cli::config::Config;
use armon_cli::server::{reload, AppState};
use armon_cli::watcher::{FileWatcher, RebuildQueue, RebuildState};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, source: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

fn users_body(state: &AppState) -> Option<ResponseBody> {
    state
        .current()
        .dispatch(&RequestContext::new("GET", "/Users"))
        .and_then(|r| r.ok())
        .map(|r| r.body)
}

async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queue_coalesces_requests_while_rebuilding() {
    let queue = Arc::new(RebuildQueue::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    tokio::spawn(queue.clone().run(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(300));
        }
    }));

    queue.request();
    assert!(wait_for(|| queue.state() == RebuildState::Rebuilding).await);

    for _ in 0..5 {
        queue.request();
    }

    assert!(wait_for(|| runs.load(Ordering::SeqCst) == 2 && queue.state() == RebuildState::Idle).await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_edit_triggers_rebuild_and_regeneration() {
    let dir = tempdir().unwrap();
    write(dir.path(), "server/Users/store.lua", "return function() return 'v1' end");

    let config = Config::parse(
        r#"{
            "server": { "files": "server" },
            "client": { "files": "server/Generated" },
            "watch": { "debounce_ms": 50 }
        }"#,
        dir.path(),
    )
    .unwrap();

    let state = Arc::new(AppState::new(Snapshot::empty()));
    reload(&config, &state).unwrap();
    assert_eq!(users_body(&state), Some(ResponseBody::Text("v1".into())));

    let queue = Arc::new(RebuildQueue::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let (rebuild_config, rebuild_state, counter) = (config.clone(), state.clone(), runs.clone());
    tokio::spawn(queue.clone().run(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = reload(&rebuild_config, &rebuild_state);
    }));

    let watcher_queue = queue.clone();
    let excluded: Vec<PathBuf> = vec![config.client_dir()];
    let _watcher = FileWatcher::new(
        &config.server_dir(),
        &excluded,
        config.debounce(),
        move |_| watcher_queue.request(),
    )
    .unwrap();

    write(dir.path(), "server/Users/store.lua", "return function() return 'v2' end");
    assert!(wait_for(|| users_body(&state) == Some(ResponseBody::Text("v2".into()))).await);

    // A broken store keeps the last good routes.
    write(dir.path(), "server/Users/store.lua", "return {");
    let before = runs.load(Ordering::SeqCst);
    assert!(wait_for(|| runs.load(Ordering::SeqCst) > before && queue.state() == RebuildState::Idle).await);
    assert_eq!(users_body(&state), Some(ResponseBody::Text("v2".into())));

    write(dir.path(), "server/Users/store.lua", "return function() return 'v3' end");
    assert!(wait_for(|| users_body(&state) == Some(ResponseBody::Text("v3".into()))).await);

    // New namespaces are picked up and get a client module.
    write(dir.path(), "server/Todos/store.lua", "return { create = function() end }");
    assert!(wait_for(|| config.client_dir().join("Todos.js").exists()).await);
    assert!(state.current().table().get("/Todos").is_some());

    // Generated output inside the server tree does not retrigger rebuilds.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let settled = runs.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(runs.load(Ordering::SeqCst), settled);
}
